//! Label registry: the selected filter plus every label that can be picked.

use tokio::sync::watch;

use crate::{
    db::{Database, LabelSnapshot},
    error::StorageResult,
};

/// Build a snapshot for `selected_label` from the labels currently stored.
pub async fn label_snapshot(db: &Database, selected_label: String) -> StorageResult<LabelSnapshot> {
    let stored = db.get_distinct_labels().await?;
    Ok(LabelSnapshot::new(selected_label, stored))
}

/// Emits a fresh [`LabelSnapshot`] now and after every selected-label write.
pub struct LabelWatcher {
    db: Database,
    label_rx: watch::Receiver<String>,
    primed: bool,
}

impl LabelWatcher {
    pub fn new(db: Database, label_rx: watch::Receiver<String>) -> Self {
        Self {
            db,
            label_rx,
            primed: false,
        }
    }

    /// Next snapshot, or `None` once the selected-label publisher is gone.
    ///
    /// The first call returns immediately; later calls wait for a change.
    pub async fn next(&mut self) -> Option<StorageResult<LabelSnapshot>> {
        if self.primed {
            self.label_rx.changed().await.ok()?;
        }
        self.primed = true;

        let selected = self.label_rx.borrow_and_update().clone();
        Some(label_snapshot(&self.db, selected).await)
    }
}
