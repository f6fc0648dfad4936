use std::path::PathBuf;

pub const DATA_DIR_ENV: &str = "VOICELOG_DATA_DIR";
pub const PAGE_SIZE_ENV: &str = "VOICELOG_PAGE_SIZE";
pub const DEFAULT_PAGE_SIZE: usize = 10;

const DATABASE_FILE: &str = "voicelog.sqlite3";
const SETTINGS_FILE: &str = "settings.json";

/// Where state lives and how large list pages are.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub page_size: usize,
}

impl AppConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(DATABASE_FILE)
    }

    pub fn settings_path(&self) -> PathBuf {
        self.data_dir.join(SETTINGS_FILE)
    }

    /// `$HOME/.voicelog`, or `./.voicelog` when there is no home directory.
    pub fn default_data_dir() -> PathBuf {
        std::env::var_os("HOME")
            .filter(|home| !home.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".voicelog")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new(Self::default_data_dir())
    }
}
