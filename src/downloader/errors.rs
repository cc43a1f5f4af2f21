// Error types for the download pipeline

use thiserror::Error;

use super::diagnostics::diagnose_error;

#[derive(Debug, Error)]
pub enum DownloadError {
    /// Bad or missing user input (URL, height, menu choice)
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Mode string that maps to no known download mode
    #[error("Unsupported download mode: {0}")]
    InvalidMode(String),

    /// Metadata lookup failed (network or extraction fault)
    #[error("Failed to fetch media info: {0}")]
    InfoFetch(String),

    /// No video variant with a known height was offered
    #[error("No playable video variant found")]
    NoPlayableVariant,

    /// The extractor gave up after exhausting its own retries
    #[error("Download failed: {detail}")]
    Transfer { detail: String },

    /// Transfer reported success but no artifact could be located
    #[error("Download incomplete: {0}")]
    DownloadIncomplete(String),

    /// yt-dlp (or another external tool) is not installed
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DownloadError {
    /// Build an info-fetch error from extractor stderr, prefixed with a diagnosis.
    pub fn info_fetch(stderr: &str) -> Self {
        Self::InfoFetch(with_diagnosis(stderr))
    }

    /// Build a transfer error from extractor stderr, prefixed with a diagnosis.
    pub fn transfer(stderr: &str) -> Self {
        Self::Transfer {
            detail: with_diagnosis(stderr),
        }
    }

    /// Errors caused by the caller's input rather than by the pipeline.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::InvalidMode(_) | Self::InfoFetch(_) | Self::NoPlayableVariant
        )
    }

    /// Stable kind name, used in logs and the interactive failure line.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::InvalidMode(_) => "invalid_mode",
            Self::InfoFetch(_) => "info_fetch",
            Self::NoPlayableVariant => "no_playable_variant",
            Self::Transfer { .. } => "transfer",
            Self::DownloadIncomplete(_) => "download_incomplete",
            Self::ToolNotFound(_) => "tool_not_found",
            Self::Io(_) => "io",
        }
    }
}

/// Keep the most useful stderr line and prepend what it most likely means.
fn with_diagnosis(stderr: &str) -> String {
    let line = stderr
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .find(|l| l.starts_with("ERROR:"))
        .or_else(|| stderr.lines().rev().map(str::trim).find(|l| !l.is_empty()))
        .unwrap_or("no output from extractor")
        .to_string();

    match diagnose_error(stderr) {
        Some(reason) if !reason.is_unknown() => match reason.hint() {
            Some(hint) => format!("{} ({}); {}", reason.description(), line, hint),
            None => format!("{} ({})", reason.description(), line),
        },
        _ => line,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transfer_keeps_error_line_and_diagnosis() {
        let stderr = "[youtube] abc: Downloading webpage\nERROR: [youtube] abc: HTTP Error 403: Forbidden\n";
        let err = DownloadError::transfer(stderr);
        let msg = err.to_string();
        assert!(msg.contains("HTTP 403"), "{msg}");
        assert!(msg.contains("ERROR: [youtube] abc: HTTP Error 403: Forbidden"), "{msg}");
    }

    #[test]
    fn transient_failures_suggest_retrying() {
        let err = DownloadError::transfer("ERROR: unable to download video data: HTTP Error 429: Too Many Requests");
        assert!(err.to_string().ends_with("; try again later"), "{err}");

        let err = DownloadError::info_fetch("ERROR: [youtube] abc: Private video. Sign in if you've been granted access");
        assert!(!err.to_string().contains("try again"), "{err}");
    }

    #[test]
    fn empty_stderr_still_produces_detail() {
        let err = DownloadError::info_fetch("");
        assert_eq!(
            err.to_string(),
            "Failed to fetch media info: no output from extractor"
        );
    }

    #[test]
    fn client_errors_are_classified() {
        assert!(DownloadError::Validation("x".into()).is_client_error());
        assert!(DownloadError::NoPlayableVariant.is_client_error());
        assert!(!DownloadError::transfer("boom").is_client_error());
        assert!(!DownloadError::DownloadIncomplete("t".into()).is_client_error());
    }
}
