// Extractor trait definition

use async_trait::async_trait;

use super::errors::DownloadError;
use super::models::{DownloadOptions, MediaInfo, TransferOutcome};
use super::progress::ProgressSink;

/// External extraction-and-transfer engine.
///
/// Implementations own retries and fragment concurrency; callers invoke each
/// method at most once per job.
#[async_trait]
pub trait MediaExtractor: Send + Sync {
    /// Name of the extractor (for logging)
    fn name(&self) -> &'static str;

    /// Fetch title and available variants without downloading
    async fn fetch_info(&self, url: &str) -> Result<MediaInfo, DownloadError>;

    /// Download per `options`, reporting progress to `progress`
    async fn download(
        &self,
        url: &str,
        options: &DownloadOptions,
        progress: &dyn ProgressSink,
    ) -> Result<TransferOutcome, DownloadError>;
}
