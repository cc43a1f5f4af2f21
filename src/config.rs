// Runtime settings shared by both surfaces

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use crate::downloader::extractors::{YtDlpExtractor, DEFAULT_INFO_TIMEOUT_SECS};
use crate::downloader::tools::{ToolManager, ToolType};
use crate::downloader::{DownloadError, JobManager, Orchestrator, TransferPolicy};

/// Default save directory for the HTTP service
pub const DEFAULT_SAVE_DIR: &str = "downloads";

/// Default bind address for the HTTP service
pub const DEFAULT_BIND: &str = "127.0.0.1:5000";

#[derive(Debug, Clone)]
pub struct Settings {
    /// Where artifacts are written
    pub save_dir: PathBuf,
    /// Explicit yt-dlp binary; discovered when unset
    pub ytdlp_path: Option<PathBuf>,
    /// Explicit ffmpeg binary or directory; passed through to yt-dlp
    pub ffmpeg_location: Option<PathBuf>,
    pub retries: u32,
    pub fragment_retries: u32,
    pub concurrent_fragments: u32,
    /// Timeout for the metadata subprocess
    pub info_timeout_secs: u64,
    pub bind: SocketAddr,
}

impl Default for Settings {
    fn default() -> Self {
        let policy = TransferPolicy::default();
        Self {
            save_dir: PathBuf::from(DEFAULT_SAVE_DIR),
            ytdlp_path: None,
            ffmpeg_location: None,
            retries: policy.retries,
            fragment_retries: policy.fragment_retries,
            concurrent_fragments: policy.concurrent_fragments,
            info_timeout_secs: DEFAULT_INFO_TIMEOUT_SECS,
            bind: SocketAddr::from(([127, 0, 0, 1], 5000)),
        }
    }
}

impl Settings {
    pub fn with_save_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.save_dir = dir.into();
        self
    }

    pub fn with_ytdlp_path(mut self, path: Option<PathBuf>) -> Self {
        self.ytdlp_path = path;
        self
    }

    pub fn with_ffmpeg_location(mut self, path: Option<PathBuf>) -> Self {
        self.ffmpeg_location = path;
        self
    }

    pub fn with_retries(mut self, retries: u32, fragment_retries: u32) -> Self {
        self.retries = retries;
        self.fragment_retries = fragment_retries;
        self
    }

    pub fn with_concurrent_fragments(mut self, count: u32) -> Self {
        // yt-dlp rejects 0
        self.concurrent_fragments = count.max(1);
        self
    }

    pub fn with_info_timeout(mut self, seconds: u64) -> Self {
        self.info_timeout_secs = seconds;
        self
    }

    pub fn with_bind(mut self, bind: SocketAddr) -> Self {
        self.bind = bind;
        self
    }

    pub fn tool_manager(&self) -> ToolManager {
        ToolManager::new()
            .with_ytdlp(self.ytdlp_path.clone())
            .with_ffmpeg(self.ffmpeg_location.clone())
    }

    pub fn transfer_policy(&self) -> TransferPolicy {
        TransferPolicy {
            retries: self.retries,
            fragment_retries: self.fragment_retries,
            concurrent_fragments: self.concurrent_fragments,
            continue_partial: true,
            ffmpeg_location: self.ffmpeg_location.clone(),
        }
    }

    /// Create the save directory if needed
    pub async fn ensure_save_dir(&self) -> Result<(), DownloadError> {
        tokio::fs::create_dir_all(&self.save_dir).await?;
        Ok(())
    }

    /// Wire the yt-dlp extractor, job manager and policy together
    pub fn orchestrator(&self) -> Orchestrator {
        let binary = self.tool_manager().resolve_binary(ToolType::YtDlp);
        let extractor = YtDlpExtractor::new(binary).with_info_timeout(self.info_timeout_secs);
        Orchestrator::new(Arc::new(extractor), JobManager::new(&self.save_dir))
            .with_policy(self.transfer_policy())
    }
}
