use std::path::PathBuf;

use crate::workspace::DownloadWorkspace;

/// A finished extraction: the downloaded file plus the workspace that owns it.
///
/// `file_path` is where the extraction tool was told to place the media.
/// Post-processing steps may leave the final file under a different name, so
/// callers check the path before trusting it. Dropping the outcome deletes
/// the workspace and everything in it.
#[derive(Debug)]
pub struct ExtractionOutcome {
    pub workspace: DownloadWorkspace,
    pub file_path: PathBuf,
    pub title: String,
    pub ext: String,
}
