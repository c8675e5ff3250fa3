mod client;
mod config;
mod error;
mod models;
mod options;
mod traits;
mod workspace;
mod ytdlp_impl;

pub use client::ExtractorClient;
pub use config::{ExtractorConfig, ExtractorKind, DEFAULT_TIMEOUT};
pub use error::{ExtractorError, Result};
pub use models::ExtractionOutcome;
pub use options::{AudioTranscode, ExtractionOptions, FormatSelector};
pub use traits::Extractor;
pub use workspace::DownloadWorkspace;
pub use ytdlp_impl::YtdlpExtractor;
