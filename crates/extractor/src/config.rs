use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(600);

#[derive(Debug, Clone)]
pub enum ExtractorKind {
    Ytdlp,
}

/// Configuration for creating an extractor client.
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    pub kind: ExtractorKind,
    /// Binary to invoke.
    pub program: PathBuf,
    /// Directory that per-extraction workspaces are created under.
    pub workdir: PathBuf,
    /// Hard cap on a single extraction run.
    pub timeout: Duration,
    /// Cookies file forwarded to the tool for sites that need a session.
    pub cookies: Option<PathBuf>,
}

impl ExtractorConfig {
    pub fn ytdlp(workdir: impl Into<PathBuf>) -> Self {
        Self {
            kind: ExtractorKind::Ytdlp,
            program: PathBuf::from("yt-dlp"),
            workdir: workdir.into(),
            timeout: DEFAULT_TIMEOUT,
            cookies: None,
        }
    }

    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_cookies(mut self, cookies: Option<PathBuf>) -> Self {
        self.cookies = cookies;
        self
    }
}
