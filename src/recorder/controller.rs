use std::{path::PathBuf, sync::Arc};

use log::{info, warn};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::{
    db::LogRecord,
    error::{RecognitionError, StorageResult},
    repository::VoiceLogRepository,
};

use super::{LogsUiState, SpeechEvent, SpeechRecognizer};

/// User intent coming from the log screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum LogEvent {
    Save,
    Share,
    DeleteAllLogs,
    StartRecording,
    Refresh,
    UpdateDraft { text: Option<String> },
    UpdateLog { record: LogRecord },
    DeleteLog { id: i64 },
    CreateLabel { label: String },
    RenameLabel { old_label: String, new_label: String },
    SelectLabel { label: String },
    SelectAllLabels,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavEvent {
    Back,
}

/// What the screen should do after an event was handled.
#[derive(Debug, Clone, PartialEq)]
pub enum EventOutcome {
    None,
    Navigate(NavEvent),
    /// Hand this `text/plain` file to the share sheet.
    Share(PathBuf),
    /// Show a short notice; recording has already been reset.
    Notify(RecognitionError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    Saved(LogRecord),
    /// Draft was empty or whitespace; nothing stored.
    Skipped,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SpeechOutcome {
    Saved(LogRecord),
    Stopped,
    Failed(RecognitionError),
}

/// Coordinates the draft, the recording flag and repository calls.
#[derive(Clone)]
pub struct LogsController {
    repo: VoiceLogRepository,
    recognizer: Arc<dyn SpeechRecognizer>,
    state: Arc<watch::Sender<LogsUiState>>,
}

impl LogsController {
    pub fn new(repo: VoiceLogRepository, recognizer: Arc<dyn SpeechRecognizer>) -> Self {
        let (state, _) = watch::channel(LogsUiState::default());
        Self {
            repo,
            recognizer,
            state: Arc::new(state),
        }
    }

    pub fn repository(&self) -> &VoiceLogRepository {
        &self.repo
    }

    pub fn ui_state(&self) -> LogsUiState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<LogsUiState> {
        self.state.subscribe()
    }

    pub fn update_draft(&self, text: Option<String>) {
        self.state.send_modify(|state| state.current_message = text);
    }

    /// Persist the trimmed draft. The draft is cleared either way.
    pub async fn save_message(&self) -> StorageResult<SaveOutcome> {
        let mut draft = None;
        self.state.send_modify(|state| {
            draft = state.savable_message().map(str::to_string);
            state.current_message = None;
        });

        let Some(text) = draft else {
            return Ok(SaveOutcome::Skipped);
        };

        let stored = self.repo.add_message(LogRecord::now(text, None)).await?;
        Ok(SaveOutcome::Saved(stored))
    }

    pub fn start_recording(&self) -> Result<(), RecognitionError> {
        if !self.recognizer.is_available() {
            self.end_recording();
            return Err(RecognitionError::Unavailable);
        }

        self.state.send_modify(|state| state.is_recording = true);
        if let Err(err) = self.recognizer.start_listening() {
            warn!("Speech recognizer failed to start: {err}");
            self.end_recording();
            return Err(err);
        }
        Ok(())
    }

    pub fn end_recording(&self) {
        self.state.send_modify(|state| state.is_recording = false);
    }

    /// Store recognized speech as-is and leave recording mode.
    pub async fn save_voice_recording(&self, text: String) -> StorageResult<LogRecord> {
        self.end_recording();
        self.repo.add_message(LogRecord::now(text, None)).await
    }

    pub async fn handle_speech_event(&self, event: SpeechEvent) -> StorageResult<SpeechOutcome> {
        match event {
            SpeechEvent::Recognized(text) => {
                let stored = self.save_voice_recording(text).await?;
                Ok(SpeechOutcome::Saved(stored))
            }
            SpeechEvent::Ended => {
                self.end_recording();
                Ok(SpeechOutcome::Stopped)
            }
            SpeechEvent::Error(code) => {
                self.end_recording();
                let err = RecognitionError::Code(code);
                info!("Speech recognition ended with error: {err}");
                Ok(SpeechOutcome::Failed(err))
            }
            SpeechEvent::Unavailable => {
                self.end_recording();
                Ok(SpeechOutcome::Failed(RecognitionError::Unavailable))
            }
        }
    }

    pub async fn dispatch(&self, event: LogEvent) -> StorageResult<EventOutcome> {
        match event {
            LogEvent::Save => {
                self.save_message().await?;
            }
            LogEvent::Share => {
                let path = self.repo.export_to_file().await?;
                return Ok(EventOutcome::Share(path));
            }
            LogEvent::DeleteAllLogs => {
                self.repo.delete_all_messages().await?;
            }
            LogEvent::StartRecording => {
                if let Err(err) = self.start_recording() {
                    return Ok(EventOutcome::Notify(err));
                }
            }
            LogEvent::Refresh => self.repo.refresh(),
            LogEvent::UpdateDraft { text } => self.update_draft(text),
            LogEvent::UpdateLog { record } => {
                self.repo.update_message(&record).await?;
                return Ok(EventOutcome::Navigate(NavEvent::Back));
            }
            LogEvent::DeleteLog { id } => {
                self.repo.delete_message(id).await?;
                return Ok(EventOutcome::Navigate(NavEvent::Back));
            }
            LogEvent::CreateLabel { label } | LogEvent::SelectLabel { label } => {
                self.repo.set_selected_label(&label)?;
            }
            LogEvent::RenameLabel {
                old_label,
                new_label,
            } => {
                self.repo
                    .rename_selected_label(&old_label, &new_label)
                    .await?;
            }
            LogEvent::SelectAllLabels => self.repo.select_all_labels()?,
        }

        Ok(EventOutcome::None)
    }
}
