// Failure diagnostics - classifies extractor stderr
//
// yt-dlp reports every failure as free text on stderr. This module maps the
// text to a small set of reasons so that error messages lead with something
// a user can act on.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    // Status codes only count when yt-dlp labels them as HTTP errors; bare
    // digits also occur inside video IDs and URLs
    static ref HTTP_403_RE: Regex =
        Regex::new(r"http error 403|\bforbidden\b").expect("valid regex");
    static ref HTTP_429_RE: Regex =
        Regex::new(r"http error 429|too many requests|rate[- ]limit").expect("valid regex");
    static ref DRM_RE: Regex =
        Regex::new(r"\b(drm|widevine|playready|fairplay)\b").expect("valid regex");
}

/// Why the extractor most likely failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureReason {
    /// HTTP 403 Forbidden
    Http403Forbidden,
    /// 429 or explicit rate limiting
    RateLimited,
    /// Site asks to prove the client is not a bot
    BotDetection,
    /// Content blocked in the caller's region
    GeoBlocked,
    /// Private video requiring authorization
    PrivateVideo,
    /// Video deleted or unavailable
    VideoUnavailable,
    /// Age-restricted content requiring login
    AgeRestricted,
    /// DRM-protected content, cannot be downloaded at all
    DrmProtected,
    /// The format expression matched no variant
    FormatUnavailable,
    /// URL not handled by any extractor
    UnsupportedUrl,
    /// Timeouts and refused connections
    NetworkTimeout,
    Unknown,
}

impl FailureReason {
    /// Whether trying again later could plausibly succeed
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Http403Forbidden | Self::RateLimited | Self::BotDetection | Self::NetworkTimeout
        )
    }

    /// Check if this is a permanent restriction (no workaround)
    pub fn is_permanent(&self) -> bool {
        matches!(self, Self::DrmProtected | Self::VideoUnavailable)
    }

    /// Short advice appended to error messages
    pub fn hint(&self) -> Option<&'static str> {
        if self.is_transient() {
            Some("try again later")
        } else if self.is_permanent() {
            Some("retrying will not help")
        } else {
            None
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    /// Human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::Http403Forbidden => "Access denied (HTTP 403)",
            Self::RateLimited => "Rate limited by the site",
            Self::BotDetection => "Bot detection triggered",
            Self::GeoBlocked => "Geographic restriction",
            Self::PrivateVideo => "Private video",
            Self::VideoUnavailable => "Video unavailable",
            Self::AgeRestricted => "Age-restricted content",
            Self::DrmProtected => "DRM-protected content",
            Self::FormatUnavailable => "Requested format is not available",
            Self::UnsupportedUrl => "Unsupported URL",
            Self::NetworkTimeout => "Network timeout",
            Self::Unknown => "Unknown failure",
        }
    }
}

/// Analyze error output and return the most specific failure reason
pub fn diagnose_error(error: &str) -> Option<FailureReason> {
    if error.trim().is_empty() {
        return None;
    }

    let lower = error.to_lowercase();

    // Checked in order of specificity
    if DRM_RE.is_match(&lower) {
        return Some(FailureReason::DrmProtected);
    }

    if lower.contains("requested format is not available") {
        return Some(FailureReason::FormatUnavailable);
    }

    if lower.contains("unsupported url") {
        return Some(FailureReason::UnsupportedUrl);
    }

    if lower.contains("age-restricted") || lower.contains("sign in to confirm your age") {
        return Some(FailureReason::AgeRestricted);
    }

    if lower.contains("private video") || lower.contains("video is private") {
        return Some(FailureReason::PrivateVideo);
    }

    if lower.contains("video unavailable")
        || lower.contains("video has been removed")
        || lower.contains("no longer available")
    {
        return Some(FailureReason::VideoUnavailable);
    }

    if lower.contains("available in your country")
        || lower.contains("blocked in your country")
        || lower.contains("geo restriction")
        || lower.contains("geo-restricted")
    {
        return Some(FailureReason::GeoBlocked);
    }

    if HTTP_429_RE.is_match(&lower) {
        return Some(FailureReason::RateLimited);
    }

    if lower.contains("not a bot") || lower.contains("captcha") || lower.contains("unusual traffic") {
        return Some(FailureReason::BotDetection);
    }

    if HTTP_403_RE.is_match(&lower) {
        return Some(FailureReason::Http403Forbidden);
    }

    if lower.contains("timeout")
        || lower.contains("timed out")
        || lower.contains("connection refused")
        || lower.contains("network is unreachable")
    {
        return Some(FailureReason::NetworkTimeout);
    }

    Some(FailureReason::Unknown)
}
