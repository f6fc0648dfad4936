use std::sync::Arc;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::{db::Database, error::StorageError};

use super::{LoadParams, LoadResult, LogPagingSource, Page, PagingSlot};

const ENABLE_LOGS: bool = true;

use crate::log_info;

/// What a list consumer should do next.
#[derive(Debug, Clone)]
pub enum PagerEvent {
    /// Drop every row shown so far; following pages come from a new source
    /// filtered on `label`.
    Refreshed { label: String },
    /// Append these rows.
    Page(Page),
    /// Loading at `key` failed; asking for the next event retries it.
    Error {
        key: usize,
        error: Arc<StorageError>,
    },
    /// Nothing older is left until something changes.
    EndOfData,
}

/// Lazy, restartable page feed that follows the selected label.
///
/// A new [`LogPagingSource`] is built whenever the selected label changes or
/// the current source is invalidated, and the feed restarts from the newest
/// entry.
pub struct MessagePager {
    db: Database,
    slot: PagingSlot,
    label_rx: watch::Receiver<String>,
    page_size: usize,
    source: Option<Arc<LogPagingSource>>,
    next_key: Option<usize>,
}

impl MessagePager {
    pub fn new(
        db: Database,
        slot: PagingSlot,
        label_rx: watch::Receiver<String>,
        page_size: usize,
    ) -> Self {
        Self {
            db,
            slot,
            label_rx,
            page_size: page_size.max(1),
            source: None,
            next_key: None,
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Label the current source is filtering on, if one has been built.
    pub fn label(&self) -> Option<&str> {
        self.source.as_deref().map(LogPagingSource::label)
    }

    pub async fn next_event(&mut self) -> PagerEvent {
        self.next_event_cancellable(&CancellationToken::new()).await
    }

    /// [`next_event`](Self::next_event) that stops waiting on the store when
    /// `cancel_token` fires. The key is kept, so the next call retries it.
    pub async fn next_event_cancellable(&mut self, cancel_token: &CancellationToken) -> PagerEvent {
        if self.needs_refresh() {
            let label = self.rebuild_source();
            return PagerEvent::Refreshed { label };
        }

        let (Some(source), Some(key)) = (self.source.clone(), self.next_key) else {
            return PagerEvent::EndOfData;
        };

        match source
            .load_cancellable(LoadParams::at(key, self.page_size), cancel_token)
            .await
        {
            LoadResult::Page(page) => {
                self.next_key = page.next_key;
                PagerEvent::Page(page)
            }
            LoadResult::Error(error) => PagerEvent::Error { key, error },
        }
    }

    /// Resolves when the selected label changes or the current source is
    /// invalidated, meaning the next event will be [`PagerEvent::Refreshed`].
    pub async fn changed(&mut self) {
        if self.needs_refresh() {
            return;
        }

        let Self {
            label_rx, source, ..
        } = self;
        let Some(source) = source.as_deref() else {
            return;
        };

        tokio::select! {
            result = label_rx.changed() => {
                if result.is_err() {
                    // Label sender is gone; only invalidation can change the feed now.
                    source.invalidated().await;
                }
            }
            _ = source.invalidated() => {}
        }
    }

    fn needs_refresh(&self) -> bool {
        match &self.source {
            None => true,
            Some(source) => {
                source.is_invalid() || self.label_rx.has_changed().unwrap_or(false)
            }
        }
    }

    fn rebuild_source(&mut self) -> String {
        let label = self.label_rx.borrow_and_update().clone();
        let source = Arc::new(LogPagingSource::new(label.clone(), self.db.clone()));
        self.slot.replace(source.clone());
        self.next_key = Some(source.refresh_key());
        self.source = Some(source);
        log_info!("Paging restarted for label '{label}'");
        label
    }
}
