// Request handlers for the HTTP service

use axum::body::Body;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Deserializer, Serialize};
use tokio_util::io::ReaderStream;
use tracing::{info, warn};

use super::error::HttpError;
use super::state::AppState;
use crate::downloader::tools::ToolInfo;
use crate::downloader::utils::validate_url;
use crate::downloader::{DownloadError, DownloadMode, DownloadRequest, NoopProgress};

#[derive(Debug, Deserialize)]
pub struct InfoRequest {
    pub url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct InfoResponse {
    pub title: String,
    pub resolutions: Vec<u32>,
}

#[derive(Debug, Deserialize)]
pub struct DownloadBody {
    pub url: Option<String>,
    #[serde(default = "default_mode")]
    pub mode: String,
    #[serde(default, deserialize_with = "lenient_height")]
    pub height: Option<u32>,
}

fn default_mode() -> String {
    "quick".to_string()
}

/// Web clients send the `<select>` value: `"720"`, or `""` before a menu loaded
fn lenient_height<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawHeight {
        Number(u32),
        Text(String),
    }

    match Option::<RawHeight>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawHeight::Number(h)) => Ok(Some(h)),
        Some(RawHeight::Text(text)) => {
            let text = text.trim();
            if text.is_empty() {
                return Ok(None);
            }
            text.parse::<u32>()
                .map(Some)
                .map_err(|_| serde::de::Error::custom(format!("invalid height: {:?}", text)))
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub tools: Vec<ToolInfo>,
}

/// `POST /info` - title and resolution menu
pub async fn info(
    State(state): State<AppState>,
    payload: Result<Json<InfoRequest>, JsonRejection>,
) -> Result<Json<InfoResponse>, HttpError> {
    let Json(body) = payload?;
    let url = validate_url(body.url.as_deref())?;

    let (media, menu) = state
        .orchestrator
        .catalog(url)
        .await
        .map_err(|e| HttpError::from(e).into_bad_request())?;

    Ok(Json(InfoResponse {
        title: media.display_title().to_string(),
        resolutions: menu.all_heights,
    }))
}

/// `POST /download` - run one job and stream the artifact back
pub async fn download(
    State(state): State<AppState>,
    payload: Result<Json<DownloadBody>, JsonRejection>,
) -> Result<Response, HttpError> {
    let Json(body) = payload?;
    let url = validate_url(body.url.as_deref())?;
    let mode = DownloadMode::parse(&body.mode, body.height)?;

    let artifact = state
        .orchestrator
        .download(DownloadRequest::new(url, mode), &NoopProgress)
        .await?;

    let file = tokio::fs::File::open(&artifact.path).await.map_err(|e| {
        warn!(path = %artifact.path.display(), "artifact vanished before streaming: {}", e);
        DownloadError::DownloadIncomplete(e.to_string())
    })?;
    let file_name = artifact.file_name();
    info!(token = %artifact.token, file = %file_name, "sending artifact");

    let headers = [
        (header::CONTENT_TYPE, content_type_for(&file_name).to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", file_name),
        ),
    ];
    Ok((headers, Body::from_stream(ReaderStream::new(file))).into_response())
}

/// `GET /health` - liveness plus tool availability
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let tools = state.tools.clone();
    // Version checks spawn blocking processes
    let tools = tokio::task::spawn_blocking(move || tools.get_all_tools())
        .await
        .unwrap_or_default();
    Json(HealthResponse {
        status: "ok",
        tools,
    })
}

fn content_type_for(file_name: &str) -> &'static str {
    match file_name.rsplit_once('.').map(|(_, ext)| ext) {
        Some("mp4") => "video/mp4",
        Some("mp3") => "audio/mpeg",
        Some("m4a") => "audio/mp4",
        Some("webm") => "video/webm",
        Some("mkv") => "video/x-matroska",
        _ => "application/octet-stream",
    }
}
