use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tokio::time::timeout;

use crate::config::ExtractorConfig;
use crate::error::{ExtractorError, Result};
use crate::models::ExtractionOutcome;
use crate::options::ExtractionOptions;
use crate::traits::Extractor;
use crate::workspace::DownloadWorkspace;

/// Output filename template: media id plus the container extension the tool picks.
const OUTPUT_TEMPLATE: &str = "%(id)s.%(ext)s";
/// How many trailing stderr lines to keep in error messages.
const STDERR_TAIL_LINES: usize = 3;

/// Extractor backed by the `yt-dlp` command line tool.
///
/// Each extraction runs in its own workspace directory and is bounded by the
/// configured timeout; the child process is killed if the run is abandoned.
pub struct YtdlpExtractor {
    program: PathBuf,
    workdir: PathBuf,
    timeout: Duration,
    cookies: Option<PathBuf>,
}

/// The fields we need from the metadata JSON that `--dump-single-json` prints.
#[derive(Debug, Deserialize)]
struct MediaInfo {
    id: String,
    title: Option<String>,
    ext: Option<String>,
}

impl YtdlpExtractor {
    pub fn new(config: ExtractorConfig) -> Self {
        Self {
            program: config.program,
            workdir: config.workdir,
            timeout: config.timeout,
            cookies: config.cookies,
        }
    }

    fn build_args(&self, url: &str, options: &ExtractionOptions, workspace: &Path) -> Vec<OsString> {
        // --no-simulate makes --dump-single-json download while still
        // printing the metadata document to stdout.
        let mut args: Vec<OsString> = vec![
            "--no-simulate".into(),
            "--dump-single-json".into(),
            "--no-playlist".into(),
            "--quiet".into(),
            "--no-warnings".into(),
            "-f".into(),
            options.format.as_str().into(),
            "-o".into(),
            workspace.join(OUTPUT_TEMPLATE).into_os_string(),
        ];
        if let Some(transcode) = &options.transcode {
            args.push("--extract-audio".into());
            args.push("--audio-format".into());
            args.push(transcode.format.as_str().into());
            args.push("--audio-quality".into());
            args.push(transcode.quality.as_str().into());
        }
        if let Some(cookies) = &self.cookies {
            args.push("--cookies".into());
            args.push(cookies.clone().into_os_string());
        }
        args.push(url.into());
        args
    }

    async fn run(&self, args: Vec<OsString>) -> Result<Vec<u8>> {
        let mut command = Command::new(&self.program);
        command
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = match timeout(self.timeout, command.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) if e.kind() == ErrorKind::NotFound => {
                return Err(ExtractorError::NotInstalled(
                    self.program.display().to_string(),
                ));
            }
            Ok(Err(e)) => return Err(e.into()),
            Err(_) => return Err(ExtractorError::Timeout(self.timeout)),
        };

        if !output.status.success() {
            return Err(ExtractorError::Failed(failure_summary(&output)));
        }
        Ok(output.stdout)
    }
}

#[async_trait]
impl Extractor for YtdlpExtractor {
    async fn extract(&self, url: &str, options: &ExtractionOptions) -> Result<ExtractionOutcome> {
        let workspace = DownloadWorkspace::create_in(&self.workdir)?;
        tracing::info!(
            "Extracting {} (format '{}') into {}",
            url,
            options.format.as_str(),
            workspace.path().display()
        );

        let args = self.build_args(url, options, workspace.path());
        let info = match self.run(args).await.and_then(|stdout| parse_metadata(&stdout)) {
            Ok(info) => info,
            Err(e) => {
                // A failed run can leave a large partial download behind
                if let Err(remove_err) = workspace.remove().await {
                    tracing::warn!("Could not remove workspace: {}", remove_err);
                }
                return Err(e);
            }
        };

        let ext = info.ext.unwrap_or_default();
        let file_name = if ext.is_empty() {
            info.id.clone()
        } else {
            format!("{}.{ext}", info.id)
        };
        let file_path = workspace.path().join(file_name);
        let title = info.title.unwrap_or_default();
        tracing::info!("Extraction finished: '{}' ({})", title, file_path.display());

        Ok(ExtractionOutcome {
            workspace,
            file_path,
            title,
            ext,
        })
    }

    fn extractor_type(&self) -> &'static str {
        "yt-dlp"
    }
}

fn failure_summary(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let lines: Vec<&str> = stderr
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    if lines.is_empty() {
        return format!("extractor exited with {}", output.status);
    }
    let tail_start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[tail_start..].join("; ")
}

fn parse_metadata(stdout: &[u8]) -> Result<MediaInfo> {
    let text = String::from_utf8_lossy(stdout);
    let line = text
        .lines()
        .rev()
        .find(|line| line.trim_start().starts_with('{'))
        .ok_or(ExtractorError::MissingMetadata)?;
    Ok(serde_json::from_str(line.trim())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::FormatSelector;

    fn test_extractor(workdir: &Path) -> YtdlpExtractor {
        YtdlpExtractor::new(ExtractorConfig::ytdlp(workdir))
    }

    fn arg_strings(args: &[OsString]) -> Vec<String> {
        args.iter()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_build_args_video() {
        let dir = tempfile::tempdir().unwrap();
        let extractor = test_extractor(dir.path());
        let options = ExtractionOptions::video(FormatSelector::from_quality(Some("720p")));
        let args = arg_strings(&extractor.build_args(
            "https://example.com/watch?v=1",
            &options,
            dir.path(),
        ));

        assert!(args.contains(&"--no-simulate".to_string()));
        assert!(args.contains(&"--dump-single-json".to_string()));
        assert!(args.contains(&"--no-playlist".to_string()));
        let f = args.iter().position(|a| a == "-f").unwrap();
        assert_eq!(
            args[f + 1],
            "bestvideo[height<=720]+bestaudio/best[height<=720]/best"
        );
        let o = args.iter().position(|a| a == "-o").unwrap();
        assert!(args[o + 1].ends_with(OUTPUT_TEMPLATE));
        assert!(args[o + 1].starts_with(dir.path().to_str().unwrap()));
        assert!(!args.contains(&"--extract-audio".to_string()));
        assert_eq!(args.last().unwrap(), "https://example.com/watch?v=1");
    }

    #[test]
    fn test_build_args_audio_transcode() {
        let dir = tempfile::tempdir().unwrap();
        let extractor = test_extractor(dir.path());
        let args = arg_strings(&extractor.build_args(
            "https://example.com/track",
            &ExtractionOptions::audio(),
            dir.path(),
        ));

        let f = args.iter().position(|a| a == "-f").unwrap();
        assert_eq!(args[f + 1], "bestaudio/best");
        let fmt = args.iter().position(|a| a == "--audio-format").unwrap();
        assert_eq!(args[fmt + 1], "mp3");
        let q = args.iter().position(|a| a == "--audio-quality").unwrap();
        assert_eq!(args[q + 1], "192K");
        assert!(args.contains(&"--extract-audio".to_string()));
    }

    #[test]
    fn test_build_args_cookies() {
        let dir = tempfile::tempdir().unwrap();
        let config =
            ExtractorConfig::ytdlp(dir.path()).with_cookies(Some(PathBuf::from("/tmp/cookies.txt")));
        let extractor = YtdlpExtractor::new(config);
        let args = arg_strings(&extractor.build_args(
            "https://example.com/v",
            &ExtractionOptions::video(FormatSelector::best()),
            dir.path(),
        ));

        let c = args.iter().position(|a| a == "--cookies").unwrap();
        assert_eq!(args[c + 1], "/tmp/cookies.txt");
    }

    #[test]
    fn test_parse_metadata() {
        let info =
            parse_metadata(br#"{"id":"abc123","title":"A Video","ext":"mp4"}"#).unwrap();
        assert_eq!(info.id, "abc123");
        assert_eq!(info.title.as_deref(), Some("A Video"));
        assert_eq!(info.ext.as_deref(), Some("mp4"));
    }

    #[test]
    fn test_parse_metadata_tolerates_null_fields() {
        let info = parse_metadata(br#"{"id":"abc123","title":null,"ext":null}"#).unwrap();
        assert_eq!(info.id, "abc123");
        assert!(info.title.is_none());
        assert!(info.ext.is_none());
    }

    #[test]
    fn test_parse_metadata_skips_leading_noise() {
        let stdout = b"WARNING: something\n{\"id\":\"x\",\"title\":\"T\",\"ext\":\"webm\"}\n";
        let info = parse_metadata(stdout).unwrap();
        assert_eq!(info.id, "x");
    }

    #[test]
    fn test_parse_metadata_without_json_fails() {
        let err = parse_metadata(b"no json here").unwrap_err();
        assert!(matches!(err, ExtractorError::MissingMetadata));
    }

    #[test]
    fn test_failure_summary_keeps_stderr_tail() {
        let output = Output {
            status: exit_status(1),
            stdout: Vec::new(),
            stderr: b"line one\nline two\nERROR: unsupported url\n".to_vec(),
        };
        let summary = failure_summary(&output);
        assert!(summary.contains("ERROR: unsupported url"));
    }

    #[cfg(unix)]
    fn exit_status(code: i32) -> std::process::ExitStatus {
        use std::os::unix::process::ExitStatusExt;
        std::process::ExitStatus::from_raw(code << 8)
    }

    #[cfg(not(unix))]
    fn exit_status(_code: i32) -> std::process::ExitStatus {
        std::process::Command::new("cmd")
            .args(["/C", "exit 1"])
            .status()
            .unwrap()
    }

    #[cfg(unix)]
    mod stub {
        use super::*;
        use std::os::unix::fs::PermissionsExt;

        // Emulates a successful run: writes the output file next to the
        // requested template and prints the metadata document.
        const STUB_OK: &str = r#"#!/bin/sh
out=""
prev=""
for arg in "$@"; do
  if [ "$prev" = "-o" ]; then out="$arg"; fi
  prev="$arg"
done
dir=$(dirname "$out")
printf 'media-bytes' > "$dir/abc123.mp4"
printf '{"id":"abc123","title":"Stub Video","ext":"mp4"}\n'
"#;

        const STUB_FAIL: &str = "#!/bin/sh\necho 'ERROR: unsupported url' >&2\nexit 1\n";

        // Succeeds without printing the metadata document
        const STUB_SILENT: &str = "#!/bin/sh\nexit 0\n";

        const STUB_SLEEP: &str = "#!/bin/sh\nsleep 5\n";

        fn write_stub(dir: &Path, body: &str) -> PathBuf {
            let path = dir.join("yt-dlp-stub");
            std::fs::write(&path, body).unwrap();
            let mut perms = std::fs::metadata(&path).unwrap().permissions();
            perms.set_mode(0o755);
            std::fs::set_permissions(&path, perms).unwrap();
            path
        }

        #[tokio::test]
        async fn test_extract_with_stub_binary() {
            let root = tempfile::tempdir().unwrap();
            let stub = write_stub(root.path(), STUB_OK);
            let extractor =
                YtdlpExtractor::new(ExtractorConfig::ytdlp(root.path()).with_program(&stub));

            let outcome = extractor
                .extract(
                    "https://example.com/v",
                    &ExtractionOptions::video(FormatSelector::best()),
                )
                .await
                .unwrap();

            assert_eq!(outcome.title, "Stub Video");
            assert_eq!(outcome.ext, "mp4");
            assert!(outcome.file_path.is_file());
            assert!(outcome.file_path.starts_with(root.path()));
            assert_eq!(std::fs::read(&outcome.file_path).unwrap(), b"media-bytes");

            let workspace_path = outcome.workspace.path().to_path_buf();
            drop(outcome);
            assert!(!workspace_path.exists());
        }

        #[tokio::test]
        async fn test_extract_failure_removes_workspace() {
            let root = tempfile::tempdir().unwrap();
            let stub = write_stub(root.path(), STUB_FAIL);
            let extractor =
                YtdlpExtractor::new(ExtractorConfig::ytdlp(root.path()).with_program(&stub));

            let err = extractor
                .extract(
                    "https://example.com/v",
                    &ExtractionOptions::video(FormatSelector::best()),
                )
                .await
                .unwrap_err();
            assert!(err.to_string().contains("unsupported url"));

            let leftover_dirs = std::fs::read_dir(root.path())
                .unwrap()
                .filter_map(|entry| entry.ok())
                .filter(|entry| entry.path().is_dir())
                .count();
            assert_eq!(leftover_dirs, 0);
        }

        #[tokio::test]
        async fn test_extract_without_metadata_removes_workspace() {
            let root = tempfile::tempdir().unwrap();
            let stub = write_stub(root.path(), STUB_SILENT);
            let extractor =
                YtdlpExtractor::new(ExtractorConfig::ytdlp(root.path()).with_program(&stub));

            let err = extractor
                .extract(
                    "https://example.com/v",
                    &ExtractionOptions::video(FormatSelector::best()),
                )
                .await
                .unwrap_err();
            assert!(matches!(err, ExtractorError::MissingMetadata));

            let leftover_dirs = std::fs::read_dir(root.path())
                .unwrap()
                .filter_map(|entry| entry.ok())
                .filter(|entry| entry.path().is_dir())
                .count();
            assert_eq!(leftover_dirs, 0);
        }

        #[tokio::test]
        async fn test_extract_reports_missing_binary() {
            let root = tempfile::tempdir().unwrap();
            let extractor = YtdlpExtractor::new(
                ExtractorConfig::ytdlp(root.path()).with_program("/nonexistent/yt-dlp"),
            );

            let err = extractor
                .extract(
                    "https://example.com/v",
                    &ExtractionOptions::video(FormatSelector::best()),
                )
                .await
                .unwrap_err();
            assert!(matches!(err, ExtractorError::NotInstalled(_)));
        }

        #[tokio::test]
        async fn test_extract_times_out() {
            let root = tempfile::tempdir().unwrap();
            let stub = write_stub(root.path(), STUB_SLEEP);
            let extractor = YtdlpExtractor::new(
                ExtractorConfig::ytdlp(root.path())
                    .with_program(&stub)
                    .with_timeout(Duration::from_millis(100)),
            );

            let err = extractor
                .extract(
                    "https://example.com/v",
                    &ExtractionOptions::video(FormatSelector::best()),
                )
                .await
                .unwrap_err();
            assert!(matches!(err, ExtractorError::Timeout(_)));

            let leftover_dirs = std::fs::read_dir(root.path())
                .unwrap()
                .filter_map(|entry| entry.ok())
                .filter(|entry| entry.path().is_dir())
                .count();
            assert_eq!(leftover_dirs, 0);
        }
    }
}
