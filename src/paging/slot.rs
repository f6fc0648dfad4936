use std::sync::{Arc, Mutex, PoisonError};

use super::LogPagingSource;

/// Owned handle to the most recently built paging source.
///
/// Mutations invalidate whatever is in the slot; pagers put each new source
/// in the slot before loading from it.
#[derive(Clone, Default)]
pub struct PagingSlot {
    current: Arc<Mutex<Option<Arc<LogPagingSource>>>>,
}

impl PagingSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `source`, returning the one it displaced.
    pub fn replace(&self, source: Arc<LogPagingSource>) -> Option<Arc<LogPagingSource>> {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(source)
    }

    pub fn current(&self) -> Option<Arc<LogPagingSource>> {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Invalidate the held source, if any. Returns whether one was held.
    pub fn invalidate(&self) -> bool {
        match self.current() {
            Some(source) => {
                source.invalidate();
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use tempfile::tempdir;

    #[test]
    fn invalidate_without_source_is_a_no_op() {
        let slot = PagingSlot::new();
        assert!(!slot.invalidate());
        assert!(slot.current().is_none());
    }

    #[tokio::test]
    async fn invalidate_reaches_latest_source_only() {
        let dir = tempdir().unwrap();
        let db = Database::new(dir.path().join("voicelog.sqlite3")).unwrap();
        let slot = PagingSlot::new();

        let first = Arc::new(LogPagingSource::new("a", db.clone()));
        let second = Arc::new(LogPagingSource::new("b", db));

        assert!(slot.replace(first.clone()).is_none());
        let displaced = slot.replace(second.clone()).unwrap();
        assert!(Arc::ptr_eq(&displaced, &first));

        assert!(slot.invalidate());
        assert!(second.is_invalid());
        assert!(!first.is_invalid());
    }
}
