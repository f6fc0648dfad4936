pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod labels;
pub mod paging;
pub mod recorder;
pub mod repository;
pub mod settings;
pub mod utils;

use clap::Parser;

pub use config::AppConfig;
pub use db::{Database, LabelSnapshot, LogId, LogRecord};
pub use error::{RecognitionError, StorageError, StorageResult};
pub use paging::{LoadParams, LoadResult, LogPagingSource, MessagePager, Page, PagerEvent};
pub use recorder::{LogsController, LogsUiState, SpeechEvent, SpeechRecognizer};
pub use repository::VoiceLogRepository;

/// Binary entry point: parse arguments, open storage, run one command.
pub fn run() -> anyhow::Result<()> {
    utils::logging::init();

    let cli = commands::Cli::parse();
    let config = cli.config();
    log::debug!("Using data directory {}", config.data_dir.display());

    let runtime = tokio::runtime::Runtime::new()?;
    let output = runtime.block_on(async move {
        let repo = VoiceLogRepository::open(&config)?;
        commands::execute(&repo, cli.command).await
    })?;

    if !output.is_empty() {
        println!("{output}");
    }
    Ok(())
}
