use std::io::ErrorKind;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use async_trait::async_trait;

use super::traits::{JobResult, SchedulerJob};

/// Age after which an orphaned workspace is deleted
const DEFAULT_MAX_AGE: Duration = Duration::from_secs(24 * 60 * 60);
/// Sweep once per hour
const SWEEP_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Deletes leftover workspace directories under the downloads root.
///
/// Workspaces are normally removed as soon as their response stream
/// finishes; this job catches directories orphaned by a crash or an
/// abandoned process.
pub struct WorkspaceSweepJob {
    downloads_dir: PathBuf,
    max_age: Duration,
}

impl WorkspaceSweepJob {
    pub fn new(downloads_dir: PathBuf) -> Self {
        Self {
            downloads_dir,
            max_age: DEFAULT_MAX_AGE,
        }
    }

    pub fn with_max_age(downloads_dir: PathBuf, max_age: Duration) -> Self {
        Self {
            downloads_dir,
            max_age,
        }
    }

    /// Removes directories whose age is at least `max_age`; returns how many.
    async fn sweep(&self) -> std::io::Result<usize> {
        let mut removed = 0;
        let mut entries = tokio::fs::read_dir(&self.downloads_dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let metadata = match entry.metadata().await {
                Ok(metadata) if metadata.is_dir() => metadata,
                _ => continue,
            };
            let age = metadata
                .modified()
                .ok()
                .and_then(|modified| SystemTime::now().duration_since(modified).ok())
                .unwrap_or_default();
            if age < self.max_age {
                continue;
            }
            match tokio::fs::remove_dir_all(entry.path()).await {
                Ok(()) => removed += 1,
                Err(e) => tracing::warn!(
                    "Could not remove stale workspace {}: {}",
                    entry.path().display(),
                    e
                ),
            }
        }

        Ok(removed)
    }
}

#[async_trait]
impl SchedulerJob for WorkspaceSweepJob {
    fn name(&self) -> &'static str {
        "WorkspaceSweep"
    }

    fn interval(&self) -> Duration {
        SWEEP_INTERVAL
    }

    async fn execute(&self) -> JobResult {
        match self.sweep().await {
            Ok(removed) if removed > 0 => {
                tracing::info!("Workspace sweep removed {} stale directories", removed);
            }
            Ok(_) => {}
            // The downloads root is created lazily on server start
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => tracing::error!("Workspace sweep failed: {}", e),
        }

        Ok(())
    }
}
