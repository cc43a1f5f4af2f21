// Interactive terminal session

use std::io::{self, IsTerminal};
use std::sync::Arc;

use tracing::debug;

use super::input::{is_yes, parse_index, LineInput, MenuChoice};
use crate::downloader::utils::validate_url;
use crate::downloader::{
    DownloadArtifact, DownloadError, DownloadMode, DownloadRequest, LogProgress, MediaInfo,
    Orchestrator, OutputNaming, ProgressSink, ResolutionMenu, TerminalProgress,
};

/// How a session ended without an error
#[derive(Debug)]
pub enum SessionOutcome {
    Completed(DownloadArtifact),
    /// The user declined the confirmation prompt
    Cancelled,
}

pub struct InteractiveSession {
    orchestrator: Orchestrator,
    input: Arc<dyn LineInput>,
    show_bar: bool,
}

impl InteractiveSession {
    pub fn new(orchestrator: Orchestrator, input: Arc<dyn LineInput>) -> Self {
        Self {
            orchestrator,
            input,
            show_bar: io::stdout().is_terminal(),
        }
    }

    pub fn with_progress_bar(mut self, enabled: bool) -> Self {
        self.show_bar = enabled;
        self
    }

    pub async fn run(&self) -> Result<SessionOutcome, DownloadError> {
        println!("=== 🎬 tube-fetch ===");
        let raw = self.ask("🔗 Enter video URL: ").await?;
        let url = validate_url(Some(&raw))?;

        println!("🔍 Fetching video info...");
        let (info, menu) = self.orchestrator.catalog(url).await?;
        println!("🎥 Title: {}\n", info.display_title());

        let (mode, label) = match self.choose_option().await? {
            MenuChoice::Quick => (DownloadMode::Quick, "Quick download".to_string()),
            MenuChoice::AudioOnly => (DownloadMode::AudioOnly, "Audio only".to_string()),
            MenuChoice::ManualResolution => match self.choose_height(&menu).await? {
                Some(height) => (
                    DownloadMode::ManualResolution {
                        target_height: Some(height),
                    },
                    format!("Downloading {}p", height),
                ),
                None => {
                    println!("❌ Download cancelled.");
                    return Ok(SessionOutcome::Cancelled);
                }
            },
        };

        let artifact = self.download(url, mode, &info, label).await?;
        println!("📁 Saved to {}", artifact.path.display());
        Ok(SessionOutcome::Completed(artifact))
    }

    async fn choose_option(&self) -> Result<MenuChoice, DownloadError> {
        println!("Choose an option:");
        for (idx, (text, _)) in MenuChoice::ENTRIES.iter().enumerate() {
            println!("{}. {}", idx + 1, text);
        }
        loop {
            let answer = self.ask("Enter 1/2/3: ").await?;
            match MenuChoice::parse(&answer) {
                Some(choice) => return Ok(choice),
                None => println!("❌ Invalid choice. Try again."),
            }
        }
    }

    /// `None` when the user does not confirm
    async fn choose_height(&self, menu: &ResolutionMenu) -> Result<Option<u32>, DownloadError> {
        if menu.is_empty() {
            return Err(DownloadError::NoPlayableVariant);
        }

        println!("\n📊 Available resolutions:");
        for (idx, height) in menu.heights.iter().enumerate() {
            println!("{}. {}p", idx + 1, height);
        }

        let height = loop {
            let answer = self.ask("Select resolution number (1 = highest): ").await?;
            match parse_index(&answer, menu.heights.len()) {
                Some(idx) => break menu.heights[idx],
                None => println!("❌ Invalid choice. Try again."),
            }
        };

        let confirm = self.ask(&format!("Download at {}p? (y/n): ", height)).await?;
        Ok(is_yes(&confirm).then_some(height))
    }

    async fn download(
        &self,
        url: &str,
        mode: DownloadMode,
        info: &MediaInfo,
        label: String,
    ) -> Result<DownloadArtifact, DownloadError> {
        let sink: Box<dyn ProgressSink> = if self.show_bar {
            Box::new(TerminalProgress::new(label))
        } else {
            Box::new(LogProgress::default())
        };
        debug!(
            %mode,
            bar = self.show_bar,
            extractor = self.orchestrator.extractor_name(),
            save_dir = %self.orchestrator.jobs().save_dir().display(),
            "starting interactive download"
        );

        let request = DownloadRequest::new(url, mode)
            .with_info(info)
            .with_naming(OutputNaming::Title);
        self.orchestrator.download(request, sink.as_ref()).await
    }

    async fn ask(&self, prompt: &str) -> Result<String, DownloadError> {
        let input = Arc::clone(&self.input);
        let prompt = prompt.to_string();
        // Blocking read, off the async workers
        tokio::task::spawn_blocking(move || input.read_line(&prompt))
            .await
            .map_err(|e| DownloadError::Io(io::Error::other(e)))?
            .map_err(DownloadError::Io)
    }
}
