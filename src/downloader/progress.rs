// Progress bridge - renders extractor byte progress
//
// Sinks are called from the task that reads extractor output, not from the
// caller of the orchestrator, so they must be Send + Sync and keep their own
// state behind a lock. A sink never panics and never reports errors back into
// the download path.

use std::io::{self, IsTerminal};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use indicatif::{HumanBytes, ProgressBar, ProgressState, ProgressStyle};
use tracing::debug;

use super::models::{ProgressEvent, ProgressStatus};

/// Receives progress events during a transfer
pub trait ProgressSink: Send + Sync {
    fn on_progress(&self, event: ProgressEvent);
}

/// Discards every event (HTTP service)
#[derive(Debug, Default)]
pub struct NoopProgress;

impl ProgressSink for NoopProgress {
    fn on_progress(&self, _event: ProgressEvent) {}
}

/// Logs progress at debug level in 10% steps (non-terminal output)
#[derive(Debug, Default)]
pub struct LogProgress {
    last_decile: AtomicU64,
}

impl ProgressSink for LogProgress {
    fn on_progress(&self, event: ProgressEvent) {
        match event.status {
            ProgressStatus::Downloading => {
                let total = event.best_total();
                let done = event.downloaded_bytes.unwrap_or(0);
                if total == 0 {
                    return;
                }
                let decile = (done.min(total) * 10) / total;
                let previous = self.last_decile.swap(decile, Ordering::Relaxed);
                if decile != previous {
                    debug!(downloaded = done, total, "download progress {}%", decile * 10);
                }
            }
            ProgressStatus::Finished => {
                self.last_decile.store(0, Ordering::Relaxed);
                debug!("stream finished");
            }
        }
    }
}

/// Terminal progress bar (interactive session)
pub struct TerminalProgress {
    label: String,
    bar: Mutex<Option<ProgressBar>>,
}

impl TerminalProgress {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            bar: Mutex::new(None),
        }
    }

    fn start_bar(&self, total: u64) -> ProgressBar {
        let bar = if total > 0 {
            let bar = ProgressBar::new(total);
            bar.set_style(Self::bar_style());
            bar
        } else {
            let bar = ProgressBar::new_spinner();
            bar.set_style(Self::spinner_style());
            bar.enable_steady_tick(Duration::from_millis(120));
            bar
        };
        bar.set_message(self.label.clone());
        bar
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::with_template(
            "{msg} {bar:30.cyan/blue} {human_bytes:>9} / {human_total:>9} ({percent:>3}%) @ {binary_bytes_per_sec} ETA {eta}",
        )
        .map(|style| {
            style.with_key("human_bytes", |state: &ProgressState, w: &mut dyn std::fmt::Write| {
                let _ = write!(w, "{}", HumanBytes(state.pos()));
            })
            .with_key("human_total", |state: &ProgressState, w: &mut dyn std::fmt::Write| {
                let value = state
                    .len()
                    .map_or_else(|| "?".to_string(), |len| HumanBytes(len).to_string());
                let _ = write!(w, "{value}");
            })
        })
        .unwrap_or_else(|_| ProgressStyle::default_bar())
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner} {msg} {bytes}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }
}

impl ProgressSink for TerminalProgress {
    fn on_progress(&self, event: ProgressEvent) {
        let Ok(mut slot) = self.bar.lock() else {
            return;
        };

        match event.status {
            ProgressStatus::Downloading => {
                let total = event.best_total();
                let bar = slot.get_or_insert_with(|| self.start_bar(total));

                // Estimates firm up as the transfer goes on
                if total > 0 && bar.length() != Some(total) {
                    bar.set_style(Self::bar_style());
                    bar.set_length(total);
                }

                // Events carry absolute counts: overwrite, never accumulate
                if let Some(done) = event.downloaded_bytes {
                    bar.set_position(done);
                }
            }
            ProgressStatus::Finished => {
                if let Some(bar) = slot.take() {
                    bar.finish_and_clear();
                }
                if io::stdout().is_terminal() {
                    println!("✅ Download complete!");
                }
            }
        }
    }
}
