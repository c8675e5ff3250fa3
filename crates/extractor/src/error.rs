use std::time::Duration;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ExtractorError>;

#[derive(Debug, Error)]
pub enum ExtractorError {
    #[error("{0} is not installed or not on PATH")]
    NotInstalled(String),

    #[error("extraction timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("{0}")]
    Failed(String),

    #[error("could not parse media metadata: {0}")]
    Metadata(#[from] serde_json::Error),

    #[error("extractor produced no media metadata")]
    MissingMetadata,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
