pub mod controller;
pub mod speech;
pub mod state;

pub use controller::{EventOutcome, LogEvent, LogsController, NavEvent, SaveOutcome, SpeechOutcome};
pub use speech::{SpeechEvent, SpeechRecognizer};
pub use state::LogsUiState;
