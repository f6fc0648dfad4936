//! Log entry models.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Identity of a log entry.
///
/// Entries are `Unassigned` until the store inserts them; the store hands
/// out ids and they never change afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Option<i64>", into = "Option<i64>")]
pub enum LogId {
    #[default]
    Unassigned,
    Assigned(i64),
}

impl LogId {
    pub fn get(self) -> Option<i64> {
        match self {
            LogId::Unassigned => None,
            LogId::Assigned(id) => Some(id),
        }
    }

    pub fn is_assigned(self) -> bool {
        matches!(self, LogId::Assigned(_))
    }
}

impl From<Option<i64>> for LogId {
    fn from(value: Option<i64>) -> Self {
        value.map_or(LogId::Unassigned, LogId::Assigned)
    }
}

impl From<LogId> for Option<i64> {
    fn from(value: LogId) -> Self {
        value.get()
    }
}

/// A stored note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRecord {
    pub id: LogId,
    pub text: String,
    /// `None` and `Some("")` are the same label for filtering.
    pub label: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl LogRecord {
    /// New, not yet persisted entry. The instant is normalized to UTC.
    pub fn new<Tz: TimeZone>(
        text: impl Into<String>,
        label: Option<String>,
        at: DateTime<Tz>,
    ) -> Self {
        Self {
            id: LogId::Unassigned,
            text: text.into(),
            label,
            timestamp: at.with_timezone(&Utc),
        }
    }

    /// Entry stamped with the current time.
    pub fn now(text: impl Into<String>, label: Option<String>) -> Self {
        Self::new(text, label, Utc::now())
    }

    /// The label as a filter key, `""` when unset.
    pub fn label_key(&self) -> &str {
        self.label.as_deref().unwrap_or("")
    }
}
