// Job identity and output management
//
// Each download gets a fresh UUID token. The token is the file stem in the
// save directory, so concurrent jobs sharing a directory never need to
// coordinate.

use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::debug;
use uuid::Uuid;

use super::errors::DownloadError;
use super::models::{DownloadMode, FormatPlan, TransferOutcome};

/// Extension placeholder filled in by the extractor
const EXT_PLACEHOLDER: &str = "%(ext)s";

/// Title placeholder filled in (and sanitized) by the extractor
const TITLE_PLACEHOLDER: &str = "%(title)s";

/// How the output file is named
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputNaming {
    /// `<token>.<ext>`: unique, used by the HTTP service
    Token,
    /// `<title>.<ext>`: human-friendly, used by the interactive session
    Title,
}

/// A single download job
#[derive(Debug, Clone)]
pub struct Job {
    pub token: String,
    pub url: String,
    pub mode: DownloadMode,
    pub plan: FormatPlan,
    pub naming: OutputNaming,
    /// `<save_dir>/<stem>.%(ext)s`
    pub output_template: PathBuf,
}

/// Allocates job tokens and finds what the extractor produced
#[derive(Debug, Clone)]
pub struct JobManager {
    save_dir: PathBuf,
}

impl JobManager {
    pub fn new(save_dir: impl Into<PathBuf>) -> Self {
        Self {
            save_dir: save_dir.into(),
        }
    }

    pub fn save_dir(&self) -> &Path {
        &self.save_dir
    }

    /// Fresh opaque token; v4 UUIDs make collisions negligible
    pub fn new_token() -> String {
        Uuid::new_v4().to_string()
    }

    /// Output template for a stem: `<save_dir>/<stem>.%(ext)s`
    pub fn output_template(&self, stem: &str) -> PathBuf {
        self.save_dir.join(format!("{}.{}", stem, EXT_PLACEHOLDER))
    }

    /// Create a job with a new token and its output template
    pub fn allocate(
        &self,
        url: &str,
        mode: DownloadMode,
        plan: FormatPlan,
        naming: OutputNaming,
    ) -> Job {
        let token = Self::new_token();
        let stem = match naming {
            OutputNaming::Token => token.as_str(),
            OutputNaming::Title => TITLE_PLACEHOLDER,
        };
        let output_template = self.output_template(stem);
        debug!(token = %token, template = %output_template.display(), "allocated job");

        Job {
            token,
            url: url.to_string(),
            mode,
            plan,
            naming,
            output_template,
        }
    }

    /// Find the file produced for `token`.
    ///
    /// Returns `None` when nothing usable starts with the token. Partial and
    /// per-stream intermediate files are ignored; among the rest the expected
    /// extension wins, then the smallest name.
    pub async fn resolve(
        &self,
        token: &str,
        expected_ext: &str,
    ) -> Result<Option<PathBuf>, DownloadError> {
        let mut entries = tokio::fs::read_dir(&self.save_dir).await?;
        let mut candidates: Vec<String> = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with(token) {
                candidates.push(name);
            }
        }

        Ok(pick_artifact(token, candidates, expected_ext).map(|name| self.save_dir.join(name)))
    }

    /// Locate the finished artifact for a job.
    ///
    /// A path reported by the extractor wins when it exists; token-named jobs
    /// fall back to scanning the save directory.
    pub async fn locate(
        &self,
        job: &Job,
        outcome: &TransferOutcome,
    ) -> Result<PathBuf, DownloadError> {
        if let Some(reported) = &outcome.reported_path {
            if tokio::fs::try_exists(reported).await.unwrap_or(false) {
                return Ok(reported.clone());
            }
            debug!(token = %job.token, path = %reported.display(), "reported artifact missing, scanning");
        }

        if job.naming == OutputNaming::Token {
            if let Some(path) = self.resolve(&job.token, job.mode.expected_extension()).await? {
                return Ok(path);
            }
        }

        Err(DownloadError::DownloadIncomplete(format!(
            "no file for job {} in {}",
            job.token,
            self.save_dir.display()
        )))
    }
}

fn pick_artifact(token: &str, mut candidates: Vec<String>, expected_ext: &str) -> Option<String> {
    candidates.retain(|name| !is_intermediate(token, name));
    candidates.sort();

    let expected_suffix = format!(".{}", expected_ext);
    let preferred = candidates
        .iter()
        .position(|name| name.ends_with(&expected_suffix));

    match preferred {
        Some(idx) => Some(candidates.swap_remove(idx)),
        None => candidates.into_iter().next(),
    }
}

/// Partial downloads and per-stream files left before a merge
fn is_intermediate(token: &str, name: &str) -> bool {
    lazy_static::lazy_static! {
        static ref INTERMEDIATE_RE: Regex =
            Regex::new(r"^\.(f[0-9A-Za-z_-]+|temp)\.[0-9A-Za-z]+$").expect("valid regex");
    }

    if name.ends_with(".part") || name.ends_with(".ytdl") || name.contains(".part-Frag") {
        return true;
    }

    INTERMEDIATE_RE.is_match(&name[token.len()..])
}
