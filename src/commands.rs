//! Command-line front end over [`VoiceLogRepository`].

use std::path::PathBuf;

use anyhow::{bail, Result};
use chrono::Local;
use clap::{Parser, Subcommand};

use crate::{
    config::{AppConfig, DATA_DIR_ENV, DEFAULT_PAGE_SIZE, PAGE_SIZE_ENV},
    db::LogRecord,
    paging::PagerEvent,
    repository::VoiceLogRepository,
};

#[derive(Debug, Parser)]
#[command(name = "voicelog", version, about = "Keep short labelled notes")]
pub struct Cli {
    /// Directory holding the database and preferences
    #[arg(long, env = DATA_DIR_ENV, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Entries per page when listing
    #[arg(long, env = PAGE_SIZE_ENV, default_value_t = DEFAULT_PAGE_SIZE, global = true)]
    pub page_size: usize,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Save a note under the selected label (or --label)
    Add {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
        #[arg(long)]
        label: Option<String>,
    },
    /// Show one page of notes for the selected label, newest first
    List {
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    /// Show the newest note for the selected label
    Last,
    /// List labels; the selected one is starred
    Labels,
    /// Select a label, creating it if nobody used it yet
    Select { label: String },
    /// Go back to the default label
    SelectAll,
    /// Rename a label on every note and select the new name
    Rename { old: String, new: String },
    /// Replace the text (and optionally label) of a note
    Edit {
        id: i64,
        text: String,
        #[arg(long)]
        label: Option<String>,
    },
    /// Delete one note
    Delete { id: i64 },
    /// Delete every note under the selected label
    DeleteAll {
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
    /// Print every note as tab-separated text
    Export {
        /// Write to the export file instead of stdout
        #[arg(long)]
        file: bool,
    },
}

impl Cli {
    pub fn config(&self) -> AppConfig {
        let data_dir = self
            .data_dir
            .clone()
            .unwrap_or_else(AppConfig::default_data_dir);
        AppConfig::new(data_dir).with_page_size(self.page_size)
    }
}

/// Run `command` and return what should be printed.
pub async fn execute(repo: &VoiceLogRepository, command: Command) -> Result<String> {
    match command {
        Command::Add { text, label } => {
            let record = LogRecord::now(text.join(" "), label);
            let stored = repo.add_message(record).await?;
            Ok(format!("saved #{}", stored.id.get().unwrap_or_default()))
        }
        Command::List { page } => list_page(repo, page.max(1)).await,
        Command::Last => Ok(match repo.last_message().await? {
            Some(record) => format_row(&record),
            None => "no logs saved".to_string(),
        }),
        Command::Labels => {
            let snapshot = repo.label_snapshot().await?;
            let lines: Vec<String> = snapshot
                .all_labels
                .iter()
                .map(|label| {
                    let marker = if *label == snapshot.selected_label { '*' } else { ' ' };
                    let name = if label.is_empty() { "(all)" } else { label.as_str() };
                    format!("{marker} {name}")
                })
                .collect();
            Ok(lines.join("\n"))
        }
        Command::Select { label } => {
            repo.set_selected_label(&label)?;
            Ok(format!("selected '{label}'"))
        }
        Command::SelectAll => {
            repo.select_all_labels()?;
            Ok("selected all".to_string())
        }
        Command::Rename { old, new } => {
            let renamed = repo.rename_selected_label(&old, &new).await?;
            Ok(format!("renamed '{old}' to '{new}' on {renamed} logs"))
        }
        Command::Edit { id, text, label } => {
            let Some(existing) = repo.message(id).await? else {
                bail!("log #{id} not found");
            };
            // Without --label the note stays in its current bucket.
            let record = LogRecord {
                text,
                label: label.or(existing.label.clone()),
                ..existing
            };
            repo.update_message(&record).await?;
            Ok(format!("updated #{id}"))
        }
        Command::Delete { id } => {
            repo.delete_message(id).await?;
            Ok(format!("deleted #{id}"))
        }
        Command::DeleteAll { yes } => {
            if !yes {
                bail!("refusing to delete without --yes");
            }
            let removed = repo.delete_all_messages().await?;
            Ok(format!("deleted {removed} logs"))
        }
        Command::Export { file } => {
            if file {
                let path = repo.export_to_file().await?;
                Ok(path.display().to_string())
            } else {
                Ok(repo.export_all_as_delimited_text().await?)
            }
        }
    }
}

async fn list_page(repo: &VoiceLogRepository, page: usize) -> Result<String> {
    let mut pager = repo.message_pages();
    let mut current = 0;

    loop {
        match pager.next_event().await {
            PagerEvent::Refreshed { .. } => current = 0,
            PagerEvent::Page(loaded) => {
                current += 1;
                if current == page {
                    let rows: Vec<String> = loaded.data.iter().map(format_row).collect();
                    return Ok(rows.join("\n"));
                }
            }
            PagerEvent::Error { error, .. } => bail!("failed to load logs: {error}"),
            PagerEvent::EndOfData => return Ok(String::new()),
        }
    }
}

fn format_row(record: &LogRecord) -> String {
    format!(
        "#{}\t{}\t{}\t{}",
        record.id.get().unwrap_or_default(),
        record
            .timestamp
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M"),
        record.label_key(),
        record.text
    )
}
