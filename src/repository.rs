//! Entry point used by front ends: log mutations, paging, labels, export.

use std::{fmt::Display, path::PathBuf, sync::Arc};

use anyhow::{anyhow, Context};
use chrono::{Local, TimeZone};
use log::{info, warn};

use crate::{
    config::AppConfig,
    db::{Database, LabelSnapshot, LogId, LogRecord},
    error::StorageResult,
    export,
    labels::{self, LabelWatcher},
    paging::{MessagePager, PagingSlot},
    settings::{SettingsStore, DEFAULT_LABEL},
};

#[derive(Clone)]
pub struct VoiceLogRepository {
    db: Database,
    settings: Arc<SettingsStore>,
    paging: PagingSlot,
    page_size: usize,
    data_dir: PathBuf,
}

impl VoiceLogRepository {
    pub fn new(
        db: Database,
        settings: Arc<SettingsStore>,
        page_size: usize,
        data_dir: PathBuf,
    ) -> Self {
        Self {
            db,
            settings,
            paging: PagingSlot::new(),
            page_size: page_size.max(1),
            data_dir,
        }
    }

    /// Open (or create) the database and preferences under `config.data_dir`.
    pub fn open(config: &AppConfig) -> anyhow::Result<Self> {
        std::fs::create_dir_all(&config.data_dir).with_context(|| {
            format!("failed to create data directory {}", config.data_dir.display())
        })?;

        let db = Database::new(config.database_path())?;
        let settings = SettingsStore::new(config.settings_path())?;

        Ok(Self::new(
            db,
            Arc::new(settings),
            config.page_size,
            config.data_dir.clone(),
        ))
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// One stored entry by id.
    pub async fn message(&self, id: i64) -> StorageResult<Option<LogRecord>> {
        Ok(self.db.get_log(id).await?)
    }

    /// Store a new entry. Entries with an unset or empty label take the
    /// selected one.
    pub async fn add_message(&self, mut record: LogRecord) -> StorageResult<LogRecord> {
        if record.label_key().is_empty() {
            let selected = self.selected_label();
            record.label = (!selected.is_empty()).then_some(selected);
        }

        let stored = self.db.insert_log(&record).await?;
        self.paging.invalidate();
        Ok(stored)
    }

    /// Save edited text and label of a stored entry.
    pub async fn update_message(&self, record: &LogRecord) -> StorageResult<()> {
        let LogId::Assigned(id) = record.id else {
            return Err(anyhow!("cannot update a log that was never saved").into());
        };

        self.db
            .update_log(id, record.text.clone(), record.label.clone())
            .await?;
        self.paging.invalidate();
        Ok(())
    }

    pub async fn delete_message(&self, id: i64) -> StorageResult<()> {
        self.db.delete_log(id).await?;
        self.paging.invalidate();
        Ok(())
    }

    /// Delete every entry under the selected label.
    pub async fn delete_all_messages(&self) -> StorageResult<usize> {
        let label = self.selected_label();
        let removed = self.db.delete_logs_with_label(&label).await?;
        info!("Deleted {removed} logs labelled '{label}'");
        self.paging.invalidate();
        Ok(removed)
    }

    pub async fn all_messages(&self) -> StorageResult<Vec<LogRecord>> {
        Ok(self.db.get_all_logs().await?)
    }

    /// Newest entry under the selected label.
    pub async fn last_message(&self) -> StorageResult<Option<LogRecord>> {
        let label = self.selected_label();
        Ok(self.db.get_most_recent_log(&label).await?)
    }

    /// Force the live list to reload without changing anything.
    pub fn refresh(&self) {
        self.paging.invalidate();
    }

    /// Page feed that follows the selected label.
    pub fn message_pages(&self) -> MessagePager {
        MessagePager::new(
            self.db.clone(),
            self.paging.clone(),
            self.settings.subscribe(),
            self.page_size,
        )
    }

    /// Label snapshots, one now and one per selected-label write.
    pub fn labels(&self) -> LabelWatcher {
        LabelWatcher::new(self.db.clone(), self.settings.subscribe())
    }

    pub async fn label_snapshot(&self) -> StorageResult<LabelSnapshot> {
        labels::label_snapshot(&self.db, self.selected_label()).await
    }

    pub fn selected_label(&self) -> String {
        self.settings.selected_label()
    }

    pub fn set_selected_label(&self, label: &str) -> StorageResult<()> {
        self.settings.set_selected_label(label)?;
        Ok(())
    }

    pub fn select_all_labels(&self) -> StorageResult<()> {
        self.set_selected_label(DEFAULT_LABEL)
    }

    /// Rename `old_name` to `new_name` on every entry, then select it.
    ///
    /// The two writes are separate. If the second fails the entries already
    /// carry `new_name` while the selection still says `old_name`.
    pub async fn rename_selected_label(
        &self,
        old_name: &str,
        new_name: &str,
    ) -> StorageResult<usize> {
        let renamed = self.db.update_label(old_name, new_name).await?;
        self.paging.invalidate();

        if let Err(err) = self.settings.set_selected_label(new_name) {
            warn!("Renamed '{old_name}' to '{new_name}' but could not select it: {err:#}");
            return Err(err.into());
        }

        info!("Renamed label '{old_name}' to '{new_name}' on {renamed} logs");
        Ok(renamed)
    }

    /// Every entry as tab-separated text, local dates in the system zone.
    pub async fn export_all_as_delimited_text(&self) -> StorageResult<String> {
        self.export_all_in_zone(&Local).await
    }

    pub async fn export_all_in_zone<Tz>(&self, local: &Tz) -> StorageResult<String>
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let records = self.db.get_all_logs().await?;
        Ok(export::format_delimited(&records, local))
    }

    /// Write the export under the data directory for sharing.
    pub async fn export_to_file(&self) -> StorageResult<PathBuf> {
        let contents = self.export_all_as_delimited_text().await?;
        Ok(export::write_export_file(&self.data_dir, &contents)?)
    }
}
