use std::sync::Arc;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::{
    db::{Database, LogRecord},
    error::StorageError,
};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_error};

/// Request for one page. A missing key means "start from the newest entry".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadParams {
    pub key: Option<usize>,
    pub load_size: usize,
}

impl LoadParams {
    pub fn initial(load_size: usize) -> Self {
        Self {
            key: None,
            load_size,
        }
    }

    pub fn at(key: usize, load_size: usize) -> Self {
        Self {
            key: Some(key),
            load_size,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub data: Vec<LogRecord>,
    /// Always `None`: the feed only grows towards older entries.
    pub prev_key: Option<usize>,
    /// `None` once a short page shows the end was reached.
    pub next_key: Option<usize>,
}

#[derive(Debug, Clone)]
pub enum LoadResult {
    Page(Page),
    /// The same key can be loaded again to retry.
    Error(Arc<StorageError>),
}

impl LoadResult {
    pub fn page(self) -> Option<Page> {
        match self {
            LoadResult::Page(page) => Some(page),
            LoadResult::Error(_) => None,
        }
    }
}

/// Pages of one label, newest first.
///
/// The label is fixed for the life of the source. Once invalidated the
/// source must be replaced with a fresh one starting at the first page.
pub struct LogPagingSource {
    label: String,
    db: Database,
    invalidated_tx: watch::Sender<bool>,
}

impl LogPagingSource {
    pub fn new(label: impl Into<String>, db: Database) -> Self {
        let (invalidated_tx, _) = watch::channel(false);
        Self {
            label: label.into(),
            db,
            invalidated_tx,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Key to restart from after invalidation.
    pub fn refresh_key(&self) -> usize {
        0
    }

    /// Load one page. A `load_size` of zero is treated as one so every full
    /// page moves the key forward.
    pub async fn load(&self, params: LoadParams) -> LoadResult {
        let offset = params.key.unwrap_or(0);
        let limit = params.load_size.max(1);
        log_debug!(
            "Loading label '{}' at offset {offset}, limit {limit}",
            self.label
        );

        match self.db.get_logs_page(&self.label, offset, limit).await {
            Ok(data) => {
                let next_key = if data.len() < limit {
                    None
                } else {
                    Some(offset + data.len())
                };
                log_debug!("Loaded {} logs, next key {next_key:?}", data.len());
                LoadResult::Page(Page {
                    data,
                    prev_key: None,
                    next_key,
                })
            }
            Err(err) => {
                log_error!("Failed to load logs for label '{}': {err:#}", self.label);
                LoadResult::Error(Arc::new(StorageError::Database(err)))
            }
        }
    }

    /// [`load`](Self::load) that gives up when `cancel_token` fires.
    ///
    /// Cancelling only abandons the wait; the source stays usable and the
    /// same key can be loaded again.
    pub async fn load_cancellable(
        &self,
        params: LoadParams,
        cancel_token: &CancellationToken,
    ) -> LoadResult {
        tokio::select! {
            biased;
            _ = cancel_token.cancelled() => {
                log_debug!("Load for label '{}' cancelled", self.label);
                LoadResult::Error(Arc::new(StorageError::Cancelled))
            }
            result = self.load(params) => result,
        }
    }

    /// Mark the source stale. Does no I/O.
    pub fn invalidate(&self) {
        self.invalidated_tx.send_replace(true);
    }

    pub fn is_invalid(&self) -> bool {
        *self.invalidated_tx.borrow()
    }

    /// Resolves once [`invalidate`](Self::invalidate) has been called.
    pub async fn invalidated(&self) {
        let mut rx = self.invalidated_tx.subscribe();
        // The sender lives in `self`, so the channel cannot close here.
        let _ = rx.wait_for(|invalid| *invalid).await;
    }
}
