// Common data models for the download pipeline

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::errors::DownloadError;

/// One encoded rendition as reported by the extractor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodingVariant {
    /// Format ID (e.g., "137", "140")
    pub format_id: String,
    /// Container extension (mp4, webm, m4a)
    pub ext: String,
    /// Vertical resolution in pixels
    pub height: Option<u32>,
    /// Video codec (avc1.640028, vp9, av01...); "none" for audio-only
    pub vcodec: Option<String>,
    /// Audio codec (mp4a.40.2, opus...); "none" for video-only
    pub acodec: Option<String>,
}

impl EncodingVariant {
    /// Whether this variant carries a video stream
    pub fn has_video(&self) -> bool {
        self.vcodec.as_deref().is_some_and(|v| v != "none")
    }
}

/// Metadata snapshot for one media resource
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaInfo {
    pub title: Option<String>,
    #[serde(rename = "formats")]
    pub variants: Vec<EncodingVariant>,
}

impl MediaInfo {
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("Unknown title")
    }
}

/// Selectable resolutions, unique and highest first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolutionMenu {
    /// Heights offered for manual selection (preferred subset when one exists)
    pub heights: Vec<u32>,
    /// Every video-capable height, whatever the container or codec
    pub all_heights: Vec<u32>,
    /// True when `heights` was built from mp4 + H.264 variants only
    pub prefer_primary_codec: bool,
}

impl ResolutionMenu {
    pub fn is_empty(&self) -> bool {
        self.heights.is_empty()
    }

    pub fn contains(&self, height: u32) -> bool {
        self.heights.contains(&height)
    }
}

/// What the caller wants downloaded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadMode {
    /// Best reliable playback, no menu needed
    Quick,
    /// Best video at or below the given height
    ManualResolution { target_height: Option<u32> },
    /// Audio track only, transcoded to mp3
    AudioOnly,
}

impl DownloadMode {
    /// Parse the wire names used by the HTTP service ("quick", "audio", "resolution").
    pub fn parse(mode: &str, height: Option<u32>) -> Result<Self, DownloadError> {
        match mode {
            "quick" => Ok(Self::Quick),
            "audio" => Ok(Self::AudioOnly),
            "resolution" => Ok(Self::ManualResolution {
                target_height: height,
            }),
            other => Err(DownloadError::InvalidMode(other.to_string())),
        }
    }

    /// Manual resolution needs the catalog for its codec preference
    pub fn needs_menu(&self) -> bool {
        matches!(self, Self::ManualResolution { .. })
    }

    /// Extension the final artifact is expected to carry
    pub fn expected_extension(&self) -> &'static str {
        match self {
            Self::AudioOnly => "mp3",
            _ => "mp4",
        }
    }
}

impl fmt::Display for DownloadMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Quick => write!(f, "quick"),
            Self::ManualResolution {
                target_height: Some(h),
            } => write!(f, "resolution({}p)", h),
            Self::ManualResolution { target_height: None } => write!(f, "resolution(any)"),
            Self::AudioOnly => write!(f, "audio"),
        }
    }
}

/// Post-processing applied by the extractor after transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostProcess {
    /// Merge separate streams into this container
    Merge { container: &'static str },
    /// Drop video and transcode audio
    ExtractAudio {
        codec: &'static str,
        bitrate_kbps: u32,
    },
}

/// Resolver output: what to ask the extractor for and what to do afterwards
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatPlan {
    pub expression: String,
    pub post_process: PostProcess,
}

/// Everything the extractor needs for one transfer
#[derive(Debug, Clone)]
pub struct DownloadOptions {
    /// `<dir>/<stem>.%(ext)s`
    pub output_template: PathBuf,
    /// Format selection expression
    pub format: String,
    pub post_process: PostProcess,
    /// Whole-transfer retries
    pub retries: u32,
    /// Per-fragment retries
    pub fragment_retries: u32,
    /// Fragments fetched in parallel
    pub concurrent_fragments: u32,
    /// Resume partially-downloaded output
    pub continue_partial: bool,
    /// Directory or binary path handed to yt-dlp as --ffmpeg-location
    pub ffmpeg_location: Option<PathBuf>,
}

/// Progress hook status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressStatus {
    Downloading,
    Finished,
}

/// Byte progress for the stream currently transferring.
///
/// Byte counts are cumulative for the stream, never deltas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressEvent {
    pub status: ProgressStatus,
    pub total_bytes: Option<u64>,
    pub total_bytes_estimate: Option<u64>,
    pub downloaded_bytes: Option<u64>,
}

impl ProgressEvent {
    pub fn downloading(downloaded: u64, total: Option<u64>) -> Self {
        Self {
            status: ProgressStatus::Downloading,
            total_bytes: total,
            total_bytes_estimate: None,
            downloaded_bytes: Some(downloaded),
        }
    }

    pub fn finished() -> Self {
        Self {
            status: ProgressStatus::Finished,
            total_bytes: None,
            total_bytes_estimate: None,
            downloaded_bytes: None,
        }
    }

    /// Exact total, then estimate, then 0 for unknown
    pub fn best_total(&self) -> u64 {
        self.total_bytes.or(self.total_bytes_estimate).unwrap_or(0)
    }
}

/// What the extractor reports after a successful transfer
#[derive(Debug, Clone, Default)]
pub struct TransferOutcome {
    /// Final file path printed by the extractor, if any
    pub reported_path: Option<PathBuf>,
}

/// A finished download handed back to the calling surface
#[derive(Debug, Clone)]
pub struct DownloadArtifact {
    pub token: String,
    pub path: PathBuf,
    pub title: Option<String>,
}

impl DownloadArtifact {
    /// File name for Content-Disposition and completion messages
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.token.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_service_mode_names() {
        assert_eq!(DownloadMode::parse("quick", None).unwrap(), DownloadMode::Quick);
        assert_eq!(DownloadMode::parse("audio", Some(720)).unwrap(), DownloadMode::AudioOnly);
        assert_eq!(
            DownloadMode::parse("resolution", Some(720)).unwrap(),
            DownloadMode::ManualResolution {
                target_height: Some(720)
            }
        );
        assert!(matches!(
            DownloadMode::parse("8k", None),
            Err(DownloadError::InvalidMode(m)) if m == "8k"
        ));
    }

    #[test]
    fn media_info_deserializes_extractor_json() {
        let json = r#"{
            "id": "abc",
            "title": "Clip",
            "formats": [
                {"format_id": "140", "ext": "m4a", "vcodec": "none", "acodec": "mp4a.40.2"},
                {"format_id": "137", "ext": "mp4", "height": 1080, "vcodec": "avc1.640028", "acodec": "none", "fps": 30}
            ]
        }"#;
        let info: MediaInfo = serde_json::from_str(json).unwrap();
        assert_eq!(info.display_title(), "Clip");
        assert_eq!(info.variants.len(), 2);
        assert!(!info.variants[0].has_video());
        assert!(info.variants[1].has_video());
        assert_eq!(info.variants[1].height, Some(1080));
    }

    #[test]
    fn best_total_falls_back_to_estimate_then_zero() {
        let mut event = ProgressEvent::downloading(10, None);
        assert_eq!(event.best_total(), 0);
        event.total_bytes_estimate = Some(500);
        assert_eq!(event.best_total(), 500);
        event.total_bytes = Some(400);
        assert_eq!(event.best_total(), 400);
    }
}
