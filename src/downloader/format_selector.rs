// FormatSelector - turns a download mode into a yt-dlp format expression
//
// Every expression lists alternatives separated by `/`, most preferred first,
// so the extractor degrades deterministically when a variant is missing.

use super::catalog::{PRIMARY_AUDIO_CONTAINER, PRIMARY_CONTAINER};
use super::models::{DownloadMode, FormatPlan, PostProcess};

/// Codec the audio-only mode transcodes to
pub const AUDIO_CODEC: &str = "mp3";

/// Target bitrate for audio-only transcodes
pub const AUDIO_BITRATE_KBPS: u32 = 192;

pub struct FormatSelector;

impl FormatSelector {
    /// Resolve the expression and post-processing for a mode.
    ///
    /// `prefer_primary_codec` comes from the resolution menu and only matters
    /// for manual resolution.
    pub fn resolve(mode: DownloadMode, prefer_primary_codec: bool) -> FormatPlan {
        match mode {
            DownloadMode::Quick => FormatPlan {
                expression: Self::quick_expression(),
                post_process: Self::merge(),
            },
            DownloadMode::ManualResolution {
                target_height: Some(height),
            } => FormatPlan {
                expression: Self::height_expression(height, prefer_primary_codec),
                post_process: Self::merge(),
            },
            // No height: widen to best video + best audio
            DownloadMode::ManualResolution { target_height: None } => FormatPlan {
                expression: "bestvideo+bestaudio/best".to_string(),
                post_process: Self::merge(),
            },
            DownloadMode::AudioOnly => FormatPlan {
                expression: "bestaudio/best".to_string(),
                post_process: PostProcess::ExtractAudio {
                    codec: AUDIO_CODEC,
                    bitrate_kbps: AUDIO_BITRATE_KBPS,
                },
            },
        }
    }

    /// mp4/H.264 + m4a, then best mp4, then anything
    fn quick_expression() -> String {
        format!(
            "bestvideo[ext={c}][vcodec*=avc1]+bestaudio[ext={a}]/best[ext={c}]/best",
            c = PRIMARY_CONTAINER,
            a = PRIMARY_AUDIO_CONTAINER,
        )
    }

    fn height_expression(height: u32, prefer_primary_codec: bool) -> String {
        if prefer_primary_codec {
            format!(
                "bestvideo[ext={c}][vcodec*=avc1][height<={h}]+bestaudio[ext={a}]/best[ext={c}]",
                c = PRIMARY_CONTAINER,
                a = PRIMARY_AUDIO_CONTAINER,
                h = height,
            )
        } else {
            // Any codec; the merge step still normalizes the container
            format!("bestvideo[height<={}]+bestaudio/best", height)
        }
    }

    fn merge() -> PostProcess {
        PostProcess::Merge {
            container: PRIMARY_CONTAINER,
        }
    }
}
