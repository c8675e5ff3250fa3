use std::io;
use std::path::Path;

use tempfile::TempDir;

const WORKSPACE_PREFIX: &str = "vidox-";

/// Scratch directory holding the files of a single extraction.
///
/// The directory lives under the configured downloads root and is deleted
/// when the workspace is dropped, so every early-return path releases its
/// disk space. A caller that streams a file out of the workspace keeps it
/// alive until the stream finishes.
#[derive(Debug)]
pub struct DownloadWorkspace {
    dir: TempDir,
}

impl DownloadWorkspace {
    pub fn create_in(parent: &Path) -> io::Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix(WORKSPACE_PREFIX)
            .tempdir_in(parent)?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Deletes the workspace without blocking the async runtime.
    pub async fn remove(self) -> io::Result<()> {
        let path = self.dir.keep();
        tokio::fs::remove_dir_all(path).await
    }
}
