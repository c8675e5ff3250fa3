use std::sync::Arc;

use extractor::{Extractor, ExtractorClient, ExtractorConfig};
use sqlx::SqlitePool;

use crate::config::Config;
use crate::services::{SchedulerService, WorkspaceSweepJob};

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Arc<Config>,
    pub extractor: Arc<dyn Extractor>,
}

impl AppState {
    pub fn new(db: SqlitePool, config: Config) -> Self {
        let extractor_config = ExtractorConfig::ytdlp(config.downloads_path())
            .with_timeout(config.extraction_timeout())
            .with_cookies(config.cookies_file.clone());
        let extractor = Arc::new(ExtractorClient::from_config(extractor_config));

        Self::with_extractor(db, config, extractor)
    }

    /// Builds the state around an injected extractor; lets tests run the
    /// handlers without spawning the real extraction tool.
    pub fn with_extractor(db: SqlitePool, config: Config, extractor: Arc<dyn Extractor>) -> Self {
        // Create and start scheduler service; its jobs keep running for the
        // lifetime of the runtime.
        let scheduler =
            SchedulerService::new().with_job(WorkspaceSweepJob::new(config.downloads_path()));
        scheduler.start();

        Self {
            db,
            config: Arc::new(config),
            extractor,
        }
    }
}
