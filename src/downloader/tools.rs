// External tool discovery (yt-dlp, ffmpeg)

use std::path::{Path, PathBuf};
use std::process::Command;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ToolType {
    YtDlp,
    Ffmpeg,
}

impl ToolType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolType::YtDlp => "yt-dlp",
            ToolType::Ffmpeg => "ffmpeg",
        }
    }

    fn version_arg(&self) -> &'static str {
        match self {
            ToolType::YtDlp => "--version",
            ToolType::Ffmpeg => "-version",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    pub tool_type: ToolType,
    pub version: Option<String>,
    pub path: Option<String>,
    pub is_available: bool,
}

/// Finds tools, honoring explicit overrides first
#[derive(Debug, Clone, Default)]
pub struct ToolManager {
    ytdlp_override: Option<PathBuf>,
    ffmpeg_override: Option<PathBuf>,
}

impl ToolManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ytdlp(mut self, path: Option<PathBuf>) -> Self {
        self.ytdlp_override = path;
        self
    }

    pub fn with_ffmpeg(mut self, path: Option<PathBuf>) -> Self {
        self.ffmpeg_override = path;
        self
    }

    pub fn get_tool_info(&self, tool_type: ToolType) -> ToolInfo {
        let path = self.locate(tool_type);
        let version = path
            .as_deref()
            .and_then(|p| Self::get_version(p, tool_type));

        ToolInfo {
            name: tool_type.as_str().to_string(),
            tool_type,
            // A binary that cannot report its version is treated as broken
            is_available: version.is_some(),
            version,
            path: path.map(|p| p.to_string_lossy().into_owned()),
        }
    }

    pub fn get_all_tools(&self) -> Vec<ToolInfo> {
        vec![
            self.get_tool_info(ToolType::YtDlp),
            self.get_tool_info(ToolType::Ffmpeg),
        ]
    }

    /// Path to run for a tool; falls back to the bare name so PATH lookup
    /// happens at spawn time.
    pub fn resolve_binary(&self, tool_type: ToolType) -> PathBuf {
        self.locate(tool_type)
            .unwrap_or_else(|| PathBuf::from(tool_type.as_str()))
    }

    fn locate(&self, tool_type: ToolType) -> Option<PathBuf> {
        let explicit = match tool_type {
            ToolType::YtDlp => self.ytdlp_override.as_ref(),
            ToolType::Ffmpeg => self.ffmpeg_override.as_ref(),
        };
        if let Some(path) = explicit {
            return Some(path.clone());
        }

        let binary_name = tool_type.as_str();

        // 1. Common install locations
        let common_paths = [
            format!("/opt/homebrew/bin/{}", binary_name),
            format!("/usr/local/bin/{}", binary_name),
            format!("/usr/bin/{}", binary_name),
        ];
        if let Some(found) = common_paths.iter().find(|p| Path::new(p).exists()) {
            return Some(PathBuf::from(found));
        }

        // 2. PATH
        if let Ok(output) = Command::new("which").arg(binary_name).output() {
            if output.status.success() {
                let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if !path.is_empty() {
                    return Some(PathBuf::from(path));
                }
            }
        }

        None
    }

    fn get_version(path: &Path, tool_type: ToolType) -> Option<String> {
        match Command::new(path).arg(tool_type.version_arg()).output() {
            Ok(output) if output.status.success() => {
                // ffmpeg prints a banner; the first line carries the version
                String::from_utf8_lossy(&output.stdout)
                    .lines()
                    .next()
                    .map(|l| l.trim().to_string())
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_override_wins() {
        let manager = ToolManager::new().with_ytdlp(Some(PathBuf::from("/nonexistent/yt-dlp")));
        assert_eq!(
            manager.resolve_binary(ToolType::YtDlp),
            PathBuf::from("/nonexistent/yt-dlp")
        );
    }

    #[test]
    fn missing_override_is_reported_unavailable() {
        let manager = ToolManager::new().with_ffmpeg(Some(PathBuf::from("/nonexistent/ffmpeg")));
        let info = manager.get_tool_info(ToolType::Ffmpeg);
        assert_eq!(info.name, "ffmpeg");
        assert!(!info.is_available);
        assert!(info.version.is_none());
        assert_eq!(info.path.as_deref(), Some("/nonexistent/ffmpeg"));
    }
}
