//! Shared fixtures: a scripted extractor and scripted prompt input.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use tube_fetch::cli::LineInput;
use tube_fetch::downloader::models::{DownloadOptions, PostProcess, TransferOutcome};
use tube_fetch::downloader::{
    DownloadError, EncodingVariant, JobManager, MediaExtractor, MediaInfo, Orchestrator,
    ProgressEvent, ProgressSink,
};

/// Extractor that never touches the network.
///
/// On a successful transfer it writes a small file where yt-dlp would, with
/// the title and extension placeholders filled in, and reports that path.
pub struct ScriptedExtractor {
    pub info: Result<MediaInfo, String>,
    /// stderr to fail the transfer with
    pub transfer_stderr: Option<String>,
    pub info_calls: AtomicUsize,
    pub download_calls: AtomicUsize,
    pub last_options: Mutex<Option<DownloadOptions>>,
}

impl ScriptedExtractor {
    pub fn new(title: &str, variants: Vec<EncodingVariant>) -> Self {
        Self {
            info: Ok(MediaInfo {
                title: Some(title.to_string()),
                variants,
            }),
            transfer_stderr: None,
            info_calls: AtomicUsize::new(0),
            download_calls: AtomicUsize::new(0),
            last_options: Mutex::new(None),
        }
    }

    pub fn failing_info(stderr: &str) -> Self {
        let mut fake = Self::new("unused", vec![]);
        fake.info = Err(stderr.to_string());
        fake
    }

    pub fn failing_transfer(mut self, stderr: &str) -> Self {
        self.transfer_stderr = Some(stderr.to_string());
        self
    }

    pub fn info_calls(&self) -> usize {
        self.info_calls.load(Ordering::SeqCst)
    }

    pub fn download_calls(&self) -> usize {
        self.download_calls.load(Ordering::SeqCst)
    }

    pub fn last_options(&self) -> Option<DownloadOptions> {
        self.last_options.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaExtractor for ScriptedExtractor {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn fetch_info(&self, _url: &str) -> Result<MediaInfo, DownloadError> {
        self.info_calls.fetch_add(1, Ordering::SeqCst);
        self.info.clone().map_err(|e| DownloadError::info_fetch(&e))
    }

    async fn download(
        &self,
        _url: &str,
        options: &DownloadOptions,
        progress: &dyn ProgressSink,
    ) -> Result<TransferOutcome, DownloadError> {
        self.download_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_options.lock().unwrap() = Some(options.clone());

        if let Some(stderr) = &self.transfer_stderr {
            return Err(DownloadError::transfer(stderr));
        }

        progress.on_progress(ProgressEvent::downloading(512, Some(1024)));
        progress.on_progress(ProgressEvent::downloading(1024, Some(1024)));
        progress.on_progress(ProgressEvent::finished());

        let ext = match &options.post_process {
            PostProcess::Merge { container } => *container,
            PostProcess::ExtractAudio { codec, .. } => *codec,
        };
        let title = self
            .info
            .as_ref()
            .ok()
            .and_then(|i| i.title.clone())
            .unwrap_or_else(|| "untitled".to_string());
        let path = options
            .output_template
            .to_string_lossy()
            .replace("%(title)s", &title)
            .replace("%(ext)s", ext);
        std::fs::write(&path, b"scripted media bytes")?;

        Ok(TransferOutcome {
            reported_path: Some(path.into()),
        })
    }
}

pub fn variant(format_id: &str, ext: &str, height: Option<u32>, vcodec: &str) -> EncodingVariant {
    EncodingVariant {
        format_id: format_id.to_string(),
        ext: ext.to_string(),
        height,
        vcodec: Some(vcodec.to_string()),
        acodec: Some("none".to_string()),
    }
}

/// Heights {1080, 1080, 720, 480}, the duplicate 1080 in another container,
/// none of them H.264.
pub fn catalog_without_preferred_codec() -> Vec<EncodingVariant> {
    vec![
        variant("137", "mp4", Some(1080), "av01.0.08M.08"),
        variant("248", "webm", Some(1080), "vp9"),
        variant("247", "webm", Some(720), "vp9"),
        variant("244", "webm", Some(480), "vp9"),
        EncodingVariant {
            format_id: "140".to_string(),
            ext: "m4a".to_string(),
            height: None,
            vcodec: Some("none".to_string()),
            acodec: Some("mp4a.40.2".to_string()),
        },
    ]
}

pub fn orchestrator(fake: &Arc<ScriptedExtractor>, save_dir: &Path) -> Orchestrator {
    Orchestrator::new(fake.clone(), JobManager::new(save_dir))
}

/// Answers prompts from a fixed script; running out behaves like a closed stdin.
pub struct ScriptedInput {
    answers: Mutex<VecDeque<String>>,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedInput {
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: Mutex::new(answers.iter().map(|a| a.to_string()).collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

impl LineInput for ScriptedInput {
    fn read_line(&self, prompt: &str) -> io::Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "script exhausted"))
    }
}
