//! Command line front end: argument parsing, the interactive session and
//! the `tools` report.

pub mod input;
pub mod session;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};

use crate::config::{Settings, DEFAULT_BIND, DEFAULT_SAVE_DIR};
use crate::downloader::tools::ToolInfo;
use crate::downloader::DownloadError;

pub use input::{ConsoleInput, LineInput, MenuChoice};
pub use session::{InteractiveSession, SessionOutcome};

#[derive(Debug, Parser)]
#[command(name = "tube-fetch")]
#[command(about = "Download media interactively or over HTTP")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Directory artifacts are written to
    #[arg(long = "save-dir", global = true, env = "TUBE_FETCH_SAVE_DIR")]
    pub save_dir: Option<PathBuf>,

    /// yt-dlp binary (discovered when unset)
    #[arg(long = "ytdlp", global = true, env = "TUBE_FETCH_YTDLP")]
    pub ytdlp: Option<PathBuf>,

    /// ffmpeg binary or directory
    #[arg(long = "ffmpeg", global = true, env = "TUBE_FETCH_FFMPEG")]
    pub ffmpeg: Option<PathBuf>,

    #[arg(long, global = true, default_value_t = 10)]
    pub retries: u32,

    #[arg(long = "fragment-retries", global = true, default_value_t = 10)]
    pub fragment_retries: u32,

    #[arg(long = "concurrent-fragments", global = true, default_value_t = 4)]
    pub concurrent_fragments: u32,

    /// Seconds allowed for the metadata lookup
    #[arg(long = "info-timeout", global = true, default_value_t = 60)]
    pub info_timeout: u64,

    /// Minimum log level; RUST_LOG takes precedence
    #[arg(long = "log-level", global = true)]
    pub log_level: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP service
    Serve {
        #[arg(long, env = "TUBE_FETCH_BIND", default_value = DEFAULT_BIND)]
        bind: SocketAddr,
    },
    /// Report yt-dlp and ffmpeg availability
    Tools,
}

impl GlobalArgs {
    /// Settings with the given save directory used when none was passed
    pub fn settings(&self, default_save_dir: &str) -> Settings {
        let save_dir = self
            .save_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(default_save_dir));
        Settings::default()
            .with_save_dir(save_dir)
            .with_ytdlp_path(self.ytdlp.clone())
            .with_ffmpeg_location(self.ffmpeg.clone())
            .with_retries(self.retries, self.fragment_retries)
            .with_concurrent_fragments(self.concurrent_fragments)
            .with_info_timeout(self.info_timeout)
    }

    pub fn log_level<'a>(&'a self, default: &'a str) -> &'a str {
        self.log_level.as_deref().unwrap_or(default)
    }
}

impl Command {
    pub fn default_log_level(command: Option<&Command>) -> &'static str {
        match command {
            Some(Command::Serve { .. }) => "info",
            _ => "error",
        }
    }

    pub fn default_save_dir(command: Option<&Command>) -> &'static str {
        match command {
            Some(Command::Serve { .. }) => DEFAULT_SAVE_DIR,
            _ => ".",
        }
    }
}

/// Exit status for a failed session: 2 for bad input, 1 otherwise
pub fn exit_code_for(err: &DownloadError) -> u8 {
    match err {
        DownloadError::Validation(_) | DownloadError::InvalidMode(_) => 2,
        _ => 1,
    }
}

/// Run the interactive session until it finishes or Ctrl-C arrives
pub async fn run_interactive(settings: Settings) -> ExitCode {
    if let Err(e) = settings.ensure_save_dir().await {
        eprintln!("error: {}", e);
        return ExitCode::from(1);
    }

    let session = InteractiveSession::new(settings.orchestrator(), Arc::new(ConsoleInput::new()));

    tokio::select! {
        result = session.run() => match result {
            Ok(_) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("error: {}", e);
                ExitCode::from(exit_code_for(&e))
            }
        },
        _ = tokio::signal::ctrl_c() => {
            println!("\n🛑 Cancelled by user.");
            ExitCode::SUCCESS
        }
    }
}

/// Print the `tools` report
pub fn print_tools(tools: &[ToolInfo]) {
    for tool in tools {
        let status = if tool.is_available { "✅" } else { "❌" };
        println!(
            "{} {:<8} {:<24} {}",
            status,
            tool.name,
            tool.version.as_deref().unwrap_or("not found"),
            tool.path.as_deref().unwrap_or("-")
        );
    }
}
