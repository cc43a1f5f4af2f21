// Orchestrator - runs one download from URL to finished file
//
// Created -> InfoFetched -> FormatResolved -> Transferring -> ArtifactResolved
// -> Done, with Failed reachable from every step. Nothing is retried here;
// retries live inside the extractor's transfer.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::catalog::build_resolution_menu;
use super::errors::DownloadError;
use super::format_selector::FormatSelector;
use super::job::{Job, JobManager, OutputNaming};
use super::models::{
    DownloadArtifact, DownloadMode, DownloadOptions, FormatPlan, MediaInfo, ResolutionMenu,
};
use super::progress::ProgressSink;
use super::traits::MediaExtractor;
use super::utils::validate_url;

/// Lifecycle of a single download
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Created,
    InfoFetched,
    FormatResolved,
    Transferring,
    ArtifactResolved,
    Done,
    Failed,
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Created => "created",
            Self::InfoFetched => "info_fetched",
            Self::FormatResolved => "format_resolved",
            Self::Transferring => "transferring",
            Self::ArtifactResolved => "artifact_resolved",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Robustness settings handed to the extractor with every transfer
#[derive(Debug, Clone)]
pub struct TransferPolicy {
    pub retries: u32,
    pub fragment_retries: u32,
    pub concurrent_fragments: u32,
    pub continue_partial: bool,
    pub ffmpeg_location: Option<PathBuf>,
}

impl Default for TransferPolicy {
    fn default() -> Self {
        Self {
            retries: 10,
            fragment_retries: 10,
            concurrent_fragments: 4,
            continue_partial: true,
            ffmpeg_location: None,
        }
    }
}

/// One download request from a surface
#[derive(Debug, Clone, Copy)]
pub struct DownloadRequest<'a> {
    pub url: &'a str,
    pub mode: DownloadMode,
    /// Info the caller already fetched (interactive session)
    pub info: Option<&'a MediaInfo>,
    pub naming: OutputNaming,
}

impl<'a> DownloadRequest<'a> {
    pub fn new(url: &'a str, mode: DownloadMode) -> Self {
        Self {
            url,
            mode,
            info: None,
            naming: OutputNaming::Token,
        }
    }

    pub fn with_info(mut self, info: &'a MediaInfo) -> Self {
        self.info = Some(info);
        self
    }

    pub fn with_naming(mut self, naming: OutputNaming) -> Self {
        self.naming = naming;
        self
    }
}

/// Tracks the state of one run and logs every transition
struct Run<'a> {
    url: &'a str,
    mode: DownloadMode,
    token: Option<String>,
    state: JobState,
}

impl<'a> Run<'a> {
    fn new(url: &'a str, mode: DownloadMode) -> Self {
        Self {
            url,
            mode,
            token: None,
            state: JobState::Created,
        }
    }

    fn advance(&mut self, next: JobState) {
        debug!(
            url = self.url,
            mode = %self.mode,
            token = self.token.as_deref().unwrap_or("-"),
            from = %self.state,
            to = %next,
            "job transition"
        );
        self.state = next;
    }

    fn fail(&mut self, err: DownloadError) -> DownloadError {
        warn!(
            url = self.url,
            mode = %self.mode,
            token = self.token.as_deref().unwrap_or("-"),
            state = %self.state,
            kind = err.kind(),
            "job failed: {}",
            err
        );
        self.state = JobState::Failed;
        err
    }
}

pub struct Orchestrator {
    extractor: Arc<dyn MediaExtractor>,
    jobs: JobManager,
    policy: TransferPolicy,
}

impl Orchestrator {
    pub fn new(extractor: Arc<dyn MediaExtractor>, jobs: JobManager) -> Self {
        Self {
            extractor,
            jobs,
            policy: TransferPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: TransferPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn jobs(&self) -> &JobManager {
        &self.jobs
    }

    pub fn extractor_name(&self) -> &'static str {
        self.extractor.name()
    }

    /// Validate the URL and fetch metadata. Never retried.
    pub async fn fetch_info(&self, url: &str) -> Result<MediaInfo, DownloadError> {
        let url = validate_url(Some(url))?;
        self.extractor.fetch_info(url).await.map_err(|e| match e {
            DownloadError::InfoFetch(_) => e,
            other => DownloadError::InfoFetch(other.to_string()),
        })
    }

    /// Metadata plus resolution menu, for `/info` and the interactive menu
    pub async fn catalog(&self, url: &str) -> Result<(MediaInfo, ResolutionMenu), DownloadError> {
        let info = self.fetch_info(url).await?;
        let menu = build_resolution_menu(&info);
        debug!(
            url,
            heights = ?menu.heights,
            all_heights = ?menu.all_heights,
            prefer_primary_codec = menu.prefer_primary_codec,
            "built resolution menu"
        );
        Ok((info, menu))
    }

    /// Run one download to completion or failure
    pub async fn download(
        &self,
        request: DownloadRequest<'_>,
        progress: &dyn ProgressSink,
    ) -> Result<DownloadArtifact, DownloadError> {
        let mut run = Run::new(request.url, request.mode);
        let url = validate_url(Some(request.url)).map_err(|e| run.fail(e))?;

        // Created -> InfoFetched
        let fetched;
        let info = match request.info {
            Some(info) => Some(info),
            None if request.mode.needs_menu() => {
                fetched = self.fetch_info(url).await.map_err(|e| run.fail(e))?;
                Some(&fetched)
            }
            None => None,
        };
        run.advance(JobState::InfoFetched);

        // InfoFetched -> FormatResolved
        let plan = self.resolve_plan(request.mode, info).map_err(|e| run.fail(e))?;
        run.advance(JobState::FormatResolved);

        // FormatResolved -> Transferring
        let job = self
            .jobs
            .allocate(url, request.mode, plan, request.naming);
        run.token = Some(job.token.clone());
        run.advance(JobState::Transferring);
        info!(token = %job.token, url, mode = %job.mode, format = %job.plan.expression, "download started");

        let options = self.options_for(&job);
        let outcome = self
            .extractor
            .download(url, &options, progress)
            .await
            .map_err(|e| {
                run.fail(match e {
                    DownloadError::Transfer { .. } => e,
                    other => DownloadError::Transfer {
                        detail: other.to_string(),
                    },
                })
            })?;

        // Transferring -> ArtifactResolved
        let path = self
            .jobs
            .locate(&job, &outcome)
            .await
            .map_err(|e| {
                run.fail(match e {
                    DownloadError::DownloadIncomplete(_) => e,
                    other => DownloadError::DownloadIncomplete(other.to_string()),
                })
            })?;
        run.advance(JobState::ArtifactResolved);

        info!(token = %job.token, path = %path.display(), "download finished");
        run.advance(JobState::Done);

        Ok(DownloadArtifact {
            token: job.token,
            path,
            title: info.and_then(|i| i.title.clone()),
        })
    }

    fn resolve_plan(
        &self,
        mode: DownloadMode,
        info: Option<&MediaInfo>,
    ) -> Result<FormatPlan, DownloadError> {
        let prefer_primary_codec = match (mode, info) {
            (DownloadMode::ManualResolution { target_height }, Some(info)) => {
                let menu = build_resolution_menu(info);
                if menu.is_empty() {
                    return Err(DownloadError::NoPlayableVariant);
                }
                match target_height {
                    Some(h) if !menu.contains(h) => {
                        debug!(height = h, heights = ?menu.heights, "target height not offered, using upper bound")
                    }
                    None => warn!("no target height given, widening to best available"),
                    _ => {}
                }
                menu.prefer_primary_codec
            }
            _ => false,
        };

        Ok(FormatSelector::resolve(mode, prefer_primary_codec))
    }

    fn options_for(&self, job: &Job) -> DownloadOptions {
        DownloadOptions {
            output_template: job.output_template.clone(),
            format: job.plan.expression.clone(),
            post_process: job.plan.post_process.clone(),
            retries: self.policy.retries,
            fragment_retries: self.policy.fragment_retries,
            concurrent_fragments: self.policy.concurrent_fragments,
            continue_partial: self.policy.continue_partial,
            ffmpeg_location: self.policy.ffmpeg_location.clone(),
        }
    }
}
