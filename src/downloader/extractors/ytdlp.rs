// yt-dlp extractor - drives the yt-dlp binary as a subprocess
//
// Info is fetched with --dump-json. Downloads ask yt-dlp for a
// machine-readable progress template and for the final file path, so the
// caller never has to guess either from human-oriented output.

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use regex::Regex;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::process::Command as TokioCommand;
use tracing::{debug, info};

use crate::downloader::errors::DownloadError;
use crate::downloader::models::{
    DownloadOptions, MediaInfo, PostProcess, ProgressEvent, ProgressStatus, TransferOutcome,
};
use crate::downloader::progress::ProgressSink;
use crate::downloader::traits::MediaExtractor;
use crate::downloader::utils::{log_extractor_line, run_output_with_timeout, spawn_error};

const PROGRESS_MARKER: &str = "TFPROGRESS";
const PATH_MARKER: &str = "TFPATH";

/// Default seconds allowed for an info fetch
pub const DEFAULT_INFO_TIMEOUT_SECS: u64 = 60;

/// A stdout line from a download, once understood
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractorLine {
    Progress(ProgressEvent),
    FinalPath(PathBuf),
}

pub struct YtDlpExtractor {
    binary: PathBuf,
    info_timeout_secs: u64,
}

impl YtDlpExtractor {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            info_timeout_secs: DEFAULT_INFO_TIMEOUT_SECS,
        }
    }

    pub fn with_info_timeout(mut self, seconds: u64) -> Self {
        self.info_timeout_secs = seconds;
        self
    }

    /// Arguments for a metadata-only run
    pub fn info_args(url: &str) -> Vec<String> {
        vec![
            "--dump-json".to_string(),
            "--no-playlist".to_string(),
            "--no-warnings".to_string(),
            url.to_string(),
        ]
    }

    /// Render download options into yt-dlp arguments
    pub fn download_args(url: &str, options: &DownloadOptions) -> Vec<String> {
        let mut args = vec![
            "--no-playlist".to_string(),
            "--newline".to_string(),
            // --print implies --quiet; keep progress lines flowing
            "--progress".to_string(),
            "--progress-template".to_string(),
            format!(
                "download:{}|%(progress.status)s|%(progress.downloaded_bytes)s|%(progress.total_bytes)s|%(progress.total_bytes_estimate)s",
                PROGRESS_MARKER
            ),
            "--print".to_string(),
            format!("after_move:{}|%(filepath)s", PATH_MARKER),
            "-f".to_string(),
            options.format.clone(),
            "-o".to_string(),
            options.output_template.to_string_lossy().into_owned(),
            "--retries".to_string(),
            options.retries.to_string(),
            "--fragment-retries".to_string(),
            options.fragment_retries.to_string(),
            "--concurrent-fragments".to_string(),
            options.concurrent_fragments.to_string(),
            // Silence ffmpeg noise
            "--postprocessor-args".to_string(),
            "ffmpeg:-loglevel error".to_string(),
        ];

        args.push(if options.continue_partial {
            "--continue".to_string()
        } else {
            "--no-continue".to_string()
        });

        match &options.post_process {
            PostProcess::Merge { container } => {
                args.push("--merge-output-format".to_string());
                args.push(container.to_string());
            }
            PostProcess::ExtractAudio {
                codec,
                bitrate_kbps,
            } => {
                args.extend([
                    "-x".to_string(),
                    "--audio-format".to_string(),
                    codec.to_string(),
                    "--audio-quality".to_string(),
                    format!("{}K", bitrate_kbps),
                ]);
            }
        }

        if let Some(location) = &options.ffmpeg_location {
            args.push("--ffmpeg-location".to_string());
            args.push(location.to_string_lossy().into_owned());
        }

        args.push(url.to_string());
        args
    }

    fn parse_info(stdout: &[u8]) -> Result<MediaInfo, DownloadError> {
        serde_json::from_slice(stdout)
            .map_err(|e| DownloadError::InfoFetch(format!("Invalid JSON from yt-dlp: {}", e)))
    }
}

/// Parse one stdout line produced by the templates in `download_args`
pub fn parse_extractor_line(line: &str) -> Option<ExtractorLine> {
    lazy_static::lazy_static! {
        static ref PROGRESS_RE: Regex = Regex::new(&format!(
            r"^{}\|(\w+)\|([^|]*)\|([^|]*)\|([^|]*)$",
            PROGRESS_MARKER
        ))
        .expect("valid regex");
    }

    let line = line.trim_end_matches(['\r', '\n']);

    if let Some(path) = line.strip_prefix(PATH_MARKER).and_then(|r| r.strip_prefix('|')) {
        if path.is_empty() || path == "NA" {
            return None;
        }
        return Some(ExtractorLine::FinalPath(PathBuf::from(path)));
    }

    let caps = PROGRESS_RE.captures(line.trim())?;
    let status = match caps.get(1)?.as_str() {
        "downloading" => ProgressStatus::Downloading,
        "finished" => ProgressStatus::Finished,
        // "error" and anything unexpected carry no byte progress
        _ => return None,
    };

    Some(ExtractorLine::Progress(ProgressEvent {
        status,
        downloaded_bytes: parse_bytes(caps.get(2)?.as_str()),
        total_bytes: parse_bytes(caps.get(3)?.as_str()),
        total_bytes_estimate: parse_bytes(caps.get(4)?.as_str()),
    }))
}

/// Next line with invalid UTF-8 replaced; `None` at EOF.
///
/// Titles and paths are not guaranteed to be UTF-8 on every platform.
async fn next_lossy_line<R>(reader: &mut R) -> std::io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();
    if reader.read_until(b'\n', &mut buf).await? == 0 {
        return Ok(None);
    }
    let line = String::from_utf8_lossy(&buf);
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

/// yt-dlp prints "NA" for missing fields and floats for estimates
fn parse_bytes(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    raw.parse::<u64>()
        .ok()
        .or_else(|| raw.parse::<f64>().ok().filter(|v| *v >= 0.0).map(|v| v as u64))
}

#[async_trait]
impl MediaExtractor for YtDlpExtractor {
    fn name(&self) -> &'static str {
        "yt-dlp"
    }

    async fn fetch_info(&self, url: &str) -> Result<MediaInfo, DownloadError> {
        debug!(binary = %self.binary.display(), url, "fetching media info");
        let output =
            run_output_with_timeout(&self.binary, Self::info_args(url), self.info_timeout_secs)
                .await?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        for line in stderr.lines() {
            log_extractor_line(self.name(), line);
        }

        if !output.status.success() {
            return Err(DownloadError::info_fetch(&stderr));
        }

        Self::parse_info(&output.stdout)
    }

    async fn download(
        &self,
        url: &str,
        options: &DownloadOptions,
        progress: &dyn ProgressSink,
    ) -> Result<TransferOutcome, DownloadError> {
        let args = Self::download_args(url, options);
        info!(binary = %self.binary.display(), format = %options.format, "starting yt-dlp");
        debug!("yt-dlp {}", args.join(" "));

        let mut child = TokioCommand::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| spawn_error(&self.binary, e))?;

        let stdout = child.stdout.take().ok_or_else(|| DownloadError::Transfer {
            detail: "failed to capture yt-dlp stdout".to_string(),
        })?;
        let stderr = child.stderr.take().ok_or_else(|| DownloadError::Transfer {
            detail: "failed to capture yt-dlp stderr".to_string(),
        })?;

        let tool = self.name();
        let stderr_task = tokio::spawn(async move {
            let mut reader = BufReader::new(stderr);
            let mut collected = Vec::new();
            while let Ok(Some(line)) = next_lossy_line(&mut reader).await {
                log_extractor_line(tool, &line);
                collected.push(line);
            }
            collected.join("\n")
        });

        let mut outcome = TransferOutcome::default();
        let mut stream_open = false;
        let mut reader = BufReader::new(stdout);
        while let Some(line) = next_lossy_line(&mut reader).await? {
            match parse_extractor_line(&line) {
                Some(ExtractorLine::Progress(event)) => {
                    stream_open = event.status == ProgressStatus::Downloading;
                    progress.on_progress(event);
                }
                Some(ExtractorLine::FinalPath(path)) => {
                    debug!(path = %path.display(), "yt-dlp reported final file");
                    outcome.reported_path = Some(path);
                }
                None => log_extractor_line(tool, &line),
            }
        }

        let status = child.wait().await?;
        let stderr_output = stderr_task.await.unwrap_or_default();

        if status.success() {
            // Some downloaders never report "finished"; close the stream ourselves
            if stream_open {
                progress.on_progress(ProgressEvent::finished());
            }
            Ok(outcome)
        } else {
            Err(DownloadError::transfer(&stderr_output))
        }
    }
}
