use std::convert::Infallible;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::task::{Context, Poll};

use axum::body::{Body, Bytes};
use axum::extract::{FromRequest, Query, Request, State};
use axum::http::{header, Method, StatusCode};
use axum::response::Response;
use axum::Form;
use futures::Stream;
use serde::Deserialize;
use tokio::fs::File;
use tokio_util::io::ReaderStream;

use extractor::{DownloadWorkspace, ExtractionOptions, ExtractionOutcome, FormatSelector};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

const VIDEO_FALLBACK_EXT: &str = ".mp4";
const AUDIO_FALLBACK_EXT: &str = ".mp3";
const VIDEO_FALLBACK_MIME: &str = "application/octet-stream";
const AUDIO_FALLBACK_MIME: &str = "audio/mpeg";

/// Download request parameters, accepted from the query string or a form
/// body. Query values win when both are present.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct DownloadParams {
    pub url: Option<String>,
    pub quality: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawDownloadParams {
    url: Option<String>,
    quality: Option<String>,
}

impl<S> FromRequest<S> for DownloadParams
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let query = Query::<RawDownloadParams>::try_from_uri(req.uri())
            .map(|Query(params)| params)
            .unwrap_or_default();
        let form = if req.method() == Method::POST {
            Form::<RawDownloadParams>::from_request(req, state)
                .await
                .map(|Form(params)| params)
                .unwrap_or_default()
        } else {
            RawDownloadParams::default()
        };

        Ok(Self {
            url: query.url.or(form.url),
            quality: query.quality.or(form.quality),
        })
    }
}

/// GET/POST /download/video
pub async fn download_video(
    State(state): State<AppState>,
    params: DownloadParams,
) -> AppResult<Response> {
    let url = validate_url(&params)?;
    let options = ExtractionOptions::video(FormatSelector::from_quality(params.quality.as_deref()));

    let outcome = state.extractor.extract(url, &options).await.map_err(|e| {
        tracing::warn!("Video extraction failed for {}: {}", url, e);
        AppError::bad_request(format!("Error downloading video: {}", e))
    })?;
    let ExtractionOutcome {
        workspace,
        file_path,
        title,
        ..
    } = outcome;

    let Some(size) = file_size(&file_path).await else {
        discard(workspace).await;
        return Err(AppError::internal("Downloaded file not found."));
    };

    let filename = attachment_filename(&title, &file_path, VIDEO_FALLBACK_EXT);
    serve_file(
        workspace,
        &file_path,
        size,
        &filename,
        VIDEO_FALLBACK_MIME,
        "Error streaming file",
    )
    .await
}

/// GET/POST /download/audio
pub async fn download_audio(
    State(state): State<AppState>,
    params: DownloadParams,
) -> AppResult<Response> {
    let url = validate_url(&params)?;
    let options = ExtractionOptions::audio();

    let outcome = state.extractor.extract(url, &options).await.map_err(|e| {
        tracing::warn!("Audio extraction failed for {}: {}", url, e);
        AppError::bad_request(format!("Error downloading audio: {}", e))
    })?;
    let ExtractionOutcome {
        workspace,
        file_path,
        title,
        ..
    } = outcome;

    // The transcode step can change the extension, so fall back to whatever
    // file the workspace ended up holding.
    let Some((file_path, size)) = resolve_media_file(file_path, workspace.path()).await else {
        discard(workspace).await;
        return Err(AppError::internal("Converted file not found."));
    };

    let filename = attachment_filename(&title, &file_path, AUDIO_FALLBACK_EXT);
    serve_file(
        workspace,
        &file_path,
        size,
        &filename,
        AUDIO_FALLBACK_MIME,
        "Error streaming audio",
    )
    .await
}

/// Local-target URLs are refused outright; everything else is left to the
/// extraction tool to judge.
fn validate_url(params: &DownloadParams) -> Result<&str, AppError> {
    let url = match params.url.as_deref() {
        Some(url) if !url.is_empty() => url,
        _ => return Err(AppError::bad_request("Missing 'url' parameter.")),
    };

    let lowered = url.to_ascii_lowercase();
    if lowered.starts_with("file://")
        || lowered.contains("127.0.0.1")
        || lowered.contains("localhost")
    {
        return Err(AppError::bad_request("Invalid URL."));
    }

    Ok(url)
}

async fn file_size(path: &Path) -> Option<u64> {
    match tokio::fs::metadata(path).await {
        Ok(metadata) if metadata.is_file() => Some(metadata.len()),
        _ => None,
    }
}

/// The expected file if it exists, otherwise the first regular file in the
/// workspace (name-sorted, for determinism).
async fn resolve_media_file(expected: PathBuf, workspace_dir: &Path) -> Option<(PathBuf, u64)> {
    if let Some(size) = file_size(&expected).await {
        return Some((expected, size));
    }

    let mut entries = tokio::fs::read_dir(workspace_dir).await.ok()?;
    let mut files = Vec::new();
    while let Ok(Some(entry)) = entries.next_entry().await {
        if let Ok(file_type) = entry.file_type().await {
            if file_type.is_file() {
                files.push(entry.path());
            }
        }
    }
    files.sort();

    let found = files.into_iter().next()?;
    let size = file_size(&found).await?;
    Some((found, size))
}

/// Failure-path cleanup; the served file never leaves the workspace, so the
/// whole directory goes at once.
async fn discard(workspace: DownloadWorkspace) {
    if let Err(e) = workspace.remove().await {
        tracing::warn!("Could not remove workspace: {}", e);
    }
}

/// Attachment filename: the media title (or a generated stand-in) plus the
/// extension of the file actually being served.
fn attachment_filename(title: &str, path: &Path, fallback_ext: &str) -> String {
    let stem = title.trim();
    let stem = if stem.is_empty() {
        uuid::Uuid::new_v4().simple().to_string()
    } else {
        stem.to_string()
    };
    let ext = path
        .extension()
        .and_then(OsStr::to_str)
        .map(|ext| format!(".{}", ext))
        .unwrap_or_else(|| fallback_ext.to_string());
    format!("{}{}", stem, ext)
}

fn guess_mime(filename: &str, fallback: &'static str) -> &'static str {
    mime_guess::from_path(filename)
        .first_raw()
        .unwrap_or(fallback)
}

/// ASCII-only fallback for the plain `filename=` parameter.
fn sanitize_ascii_filename(filename: &str) -> String {
    let sanitized: String = filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | ' ' | '(' | ')') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = sanitized.trim();
    if trimmed.is_empty() {
        "download.bin".to_string()
    } else {
        trimmed.to_string()
    }
}

/// `Content-Disposition` carrying both the ASCII fallback and the RFC 5987
/// UTF-8 form, so non-ASCII titles survive the trip.
fn content_disposition(filename: &str) -> String {
    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        sanitize_ascii_filename(filename),
        urlencoding::encode(filename)
    )
}

/// Streams `path` as an attachment. The workspace rides along with the body
/// and is deleted once the stream is dropped, which covers both normal
/// completion and client disconnect.
async fn serve_file(
    workspace: DownloadWorkspace,
    path: &Path,
    size: u64,
    filename: &str,
    fallback_mime: &'static str,
    stream_error_prefix: &str,
) -> AppResult<Response> {
    let file = match File::open(path).await {
        Ok(file) => file,
        Err(e) => {
            discard(workspace).await;
            return Err(AppError::internal(format!(
                "{}: {}",
                stream_error_prefix, e
            )));
        }
    };

    let stream = WorkspaceStream::new(ReaderStream::new(file), workspace);
    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, guess_mime(filename, fallback_mime))
        .header(header::CONTENT_LENGTH, size)
        .header(header::CONTENT_DISPOSITION, content_disposition(filename))
        .body(Body::from_stream(stream))
        .map_err(|e| AppError::internal(format!("{}: {}", stream_error_prefix, e)))?;

    Ok(response)
}

/// File stream that owns the workspace of the file it is serving.
struct WorkspaceStream {
    inner: ReaderStream<File>,
    workspace: Option<DownloadWorkspace>,
}

impl WorkspaceStream {
    fn new(inner: ReaderStream<File>, workspace: DownloadWorkspace) -> Self {
        Self {
            inner,
            workspace: Some(workspace),
        }
    }
}

impl Stream for WorkspaceStream {
    type Item = std::io::Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

impl Drop for WorkspaceStream {
    fn drop(&mut self) {
        let Some(workspace) = self.workspace.take() else {
            return;
        };
        // Directory removal is blocking; push it off the async worker when
        // a runtime is available.
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn_blocking(move || drop(workspace));
            }
            Err(_) => drop(workspace),
        }
    }
}
