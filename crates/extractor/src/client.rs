use async_trait::async_trait;

use crate::config::{ExtractorConfig, ExtractorKind};
use crate::error::Result;
use crate::models::ExtractionOutcome;
use crate::options::ExtractionOptions;
use crate::traits::Extractor;
use crate::ytdlp_impl::YtdlpExtractor;

/// Unified extractor client wrapping the configured backend.
pub enum ExtractorClient {
    Ytdlp(YtdlpExtractor),
}

impl ExtractorClient {
    pub fn from_config(config: ExtractorConfig) -> Self {
        match config.kind {
            ExtractorKind::Ytdlp => Self::Ytdlp(YtdlpExtractor::new(config)),
        }
    }
}

#[async_trait]
impl Extractor for ExtractorClient {
    async fn extract(&self, url: &str, options: &ExtractionOptions) -> Result<ExtractionOutcome> {
        match self {
            Self::Ytdlp(client) => client.extract(url, options).await,
        }
    }

    fn extractor_type(&self) -> &'static str {
        match self {
            Self::Ytdlp(client) => client.extractor_type(),
        }
    }
}
