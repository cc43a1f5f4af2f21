// Downloader module - format resolution and download orchestration

pub mod catalog;
pub mod diagnostics;
pub mod errors;
pub mod extractors;
pub mod format_selector;
pub mod job;
pub mod models;
pub mod orchestrator;
pub mod progress;
pub mod tools;
pub mod traits;
pub mod utils;

pub use catalog::build_resolution_menu;
pub use errors::DownloadError;
pub use format_selector::FormatSelector;
pub use job::{JobManager, OutputNaming};
pub use models::{
    DownloadArtifact, DownloadMode, EncodingVariant, MediaInfo, ProgressEvent, ProgressStatus,
    ResolutionMenu,
};
pub use orchestrator::{DownloadRequest, JobState, Orchestrator, TransferPolicy};
pub use progress::{LogProgress, NoopProgress, ProgressSink, TerminalProgress};
pub use traits::MediaExtractor;
