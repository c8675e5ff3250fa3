use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    /// Root for runtime data; per-extraction workspaces live underneath.
    pub data_path: PathBuf,
    /// Cookies file handed to the extraction tool, for sites that need a session.
    pub cookies_file: Option<PathBuf>,
    /// Hard cap on a single extraction run, in seconds.
    pub extraction_timeout_secs: u64,
}

impl Config {
    pub fn new(database_url: String, data_path: PathBuf) -> Self {
        Self {
            database_url,
            max_connections: 5,
            data_path,
            cookies_file: None,
            extraction_timeout_secs: 600,
        }
    }

    /// Directory that per-extraction workspaces are created under.
    pub fn downloads_path(&self) -> PathBuf {
        self.data_path.join("downloads")
    }

    pub fn extraction_timeout(&self) -> Duration {
        Duration::from_secs(self.extraction_timeout_secs)
    }
}
