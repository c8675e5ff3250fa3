use async_trait::async_trait;

use crate::error::Result;
use crate::models::ExtractionOutcome;
use crate::options::ExtractionOptions;

/// A media extraction capability.
///
/// Implementations download the media behind `url` into a fresh workspace
/// directory and hand that workspace to the caller, which decides how long
/// the downloaded file stays on disk.
#[async_trait]
pub trait Extractor: Send + Sync {
    async fn extract(&self, url: &str, options: &ExtractionOptions) -> Result<ExtractionOutcome>;

    /// Short name of the backing tool, for logs.
    fn extractor_type(&self) -> &'static str;
}
