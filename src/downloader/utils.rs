// Helper functions shared by the extractor and the surfaces

use std::path::Path;
use std::process::Stdio;

use tokio::io::AsyncReadExt;
use tokio::process::Command as TokioCommand;
use tokio::time::{timeout, Duration};
use tracing::{debug, error, warn};

use super::errors::DownloadError;

/// Reject anything that is not an http(s) URL before touching the network.
pub fn validate_url(url: Option<&str>) -> Result<&str, DownloadError> {
    match url.map(str::trim) {
        Some(u) if !u.is_empty() && u.starts_with("http") => Ok(u),
        _ => Err(DownloadError::Validation("Invalid URL".to_string())),
    }
}

/// Re-emit one extractor stderr line at a level matching its prefix.
///
/// yt-dlp prefixes real failures with `ERROR:` and noise with `WARNING:`;
/// everything else is debug chatter.
pub fn log_extractor_line(tool: &str, line: &str) {
    let line = line.trim();
    if line.is_empty() {
        return;
    }
    if let Some(rest) = line.strip_prefix("ERROR:") {
        error!(tool, "{}", rest.trim());
    } else if let Some(rest) = line.strip_prefix("WARNING:") {
        warn!(tool, "{}", rest.trim());
    } else {
        debug!(tool, "{}", line);
    }
}

/// Run command with timeout, capturing stdout and stderr
pub async fn run_output_with_timeout(
    program: &Path,
    args: Vec<String>,
    timeout_secs: u64,
) -> Result<std::process::Output, DownloadError> {
    let mut child = TokioCommand::new(program)
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| spawn_error(program, e))?;

    let mut stdout_pipe = child
        .stdout
        .take()
        .ok_or_else(|| pipe_error(program, "stdout"))?;
    let mut stderr_pipe = child
        .stderr
        .take()
        .ok_or_else(|| pipe_error(program, "stderr"))?;

    let stdout_task = tokio::spawn(async move {
        let mut buf = Vec::new();
        stdout_pipe.read_to_end(&mut buf).await.map(|_| buf)
    });
    let stderr_task = tokio::spawn(async move {
        let mut buf = Vec::new();
        stderr_pipe.read_to_end(&mut buf).await.map(|_| buf)
    });

    match timeout(Duration::from_secs(timeout_secs), child.wait()).await {
        Ok(status) => {
            let status = status?;
            let stdout = join_pipe(stdout_task).await?;
            let stderr = join_pipe(stderr_task).await?;
            Ok(std::process::Output {
                status,
                stdout,
                stderr,
            })
        }
        Err(_) => {
            let _ = child.kill().await;
            stdout_task.abort();
            stderr_task.abort();
            Err(DownloadError::InfoFetch(format!(
                "{} timed out after {}s",
                program.display(),
                timeout_secs
            )))
        }
    }
}

async fn join_pipe(
    task: tokio::task::JoinHandle<std::io::Result<Vec<u8>>>,
) -> Result<Vec<u8>, DownloadError> {
    task.await
        .map_err(|e| DownloadError::Io(std::io::Error::other(e)))?
        .map_err(DownloadError::Io)
}

/// Map a spawn failure, distinguishing a missing binary
pub fn spawn_error(program: &Path, err: std::io::Error) -> DownloadError {
    if err.kind() == std::io::ErrorKind::NotFound {
        DownloadError::ToolNotFound(program.display().to_string())
    } else {
        DownloadError::Io(err)
    }
}

fn pipe_error(program: &Path, which: &str) -> DownloadError {
    DownloadError::Io(std::io::Error::other(format!(
        "failed to capture {} from {}",
        which,
        program.display()
    )))
}
