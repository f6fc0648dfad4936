use serde::{Deserialize, Serialize};

/// What the log screen shows besides the list itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogsUiState {
    /// Typed draft not yet saved.
    pub current_message: Option<String>,
    pub is_recording: bool,
}

impl LogsUiState {
    /// Trimmed draft, or `None` when there is nothing worth saving.
    pub fn savable_message(&self) -> Option<&str> {
        self.current_message
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }
}
