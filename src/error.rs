//! Error types shared across the storage-facing API.

use thiserror::Error;

/// Failure reading or writing persisted state.
///
/// Nothing retries these automatically; the caller decides.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage operation cancelled")]
    Cancelled,
    #[error(transparent)]
    Database(#[from] anyhow::Error),
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Failure reported by the speech recognizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RecognitionError {
    #[error("speech recognition is not available")]
    Unavailable,
    #[error("speech recognition failed with code {0}")]
    Code(i32),
}

impl RecognitionError {
    /// Platform code for "nothing recognizable was heard".
    pub const NO_MATCH: i32 = 7;
    /// Platform code for a missing microphone permission.
    pub const INSUFFICIENT_PERMISSIONS: i32 = 9;

    /// Short text suitable for a toast.
    pub fn user_message(&self) -> &'static str {
        match self {
            RecognitionError::Unavailable => "No speech recognition available",
            RecognitionError::Code(Self::NO_MATCH) => "No speech detected",
            RecognitionError::Code(Self::INSUFFICIENT_PERMISSIONS) => {
                "Open the app and allow audio access"
            }
            RecognitionError::Code(_) => "Recording failed",
        }
    }
}
