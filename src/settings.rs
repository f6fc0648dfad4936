use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::PathBuf,
    sync::{PoisonError, RwLock},
};
use tokio::sync::watch;

/// Selected label meaning "nothing chosen yet".
pub const DEFAULT_LABEL: &str = "";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct UserSettings {
    selected_label: String,
}

/// Single-key preference file holding the active label filter.
///
/// Writes hit disk first and are then published to every subscriber, so a
/// reader woken by a change always sees the persisted value.
pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<UserSettings>,
    selected_label_tx: watch::Sender<String>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                warn!(
                    "Ignoring unreadable settings at {}: {err}",
                    path.display()
                );
                UserSettings::default()
            })
        } else {
            UserSettings::default()
        };

        let (selected_label_tx, _) = watch::channel(data.selected_label.clone());

        Ok(Self {
            path,
            data: RwLock::new(data),
            selected_label_tx,
        })
    }

    pub fn selected_label(&self) -> String {
        self.data
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .selected_label
            .clone()
    }

    pub fn set_selected_label(&self, label: &str) -> Result<()> {
        let mut guard = self.data.write().unwrap_or_else(PoisonError::into_inner);
        let next = UserSettings {
            selected_label: label.to_string(),
        };
        self.persist(&next)?;
        *guard = next;
        self.selected_label_tx.send_replace(label.to_string());
        Ok(())
    }

    /// Receiver that wakes on every write, including rewrites of the same
    /// value.
    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.selected_label_tx.subscribe()
    }

    fn persist(&self, data: &UserSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}
