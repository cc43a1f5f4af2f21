// HTTP error mapping for the service surface

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::downloader::DownloadError;

#[derive(Debug, Error)]
pub enum HttpError {
    /// Bad input, bad mode, or the media could not be inspected
    #[error("{0}")]
    BadRequest(String),

    /// The pipeline failed after accepting the request
    #[error("{0}")]
    Internal(String),
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            HttpError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            HttpError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}

impl From<DownloadError> for HttpError {
    fn from(err: DownloadError) -> Self {
        match err {
            DownloadError::Validation(msg) => HttpError::BadRequest(msg),
            e if e.is_client_error() => HttpError::BadRequest(e.to_string()),
            e => HttpError::Internal(e.to_string()),
        }
    }
}

impl From<JsonRejection> for HttpError {
    fn from(rejection: JsonRejection) -> Self {
        HttpError::BadRequest(rejection.body_text())
    }
}

impl HttpError {
    /// `/info` reports every failure as a client error
    pub fn into_bad_request(self) -> Self {
        match self {
            HttpError::Internal(msg) => HttpError::BadRequest(msg),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_error_kinds_to_status() {
        let cases = [
            (DownloadError::Validation("Invalid URL".into()), StatusCode::BAD_REQUEST),
            (DownloadError::InvalidMode("8k".into()), StatusCode::BAD_REQUEST),
            (DownloadError::InfoFetch("x".into()), StatusCode::BAD_REQUEST),
            (DownloadError::NoPlayableVariant, StatusCode::BAD_REQUEST),
            (DownloadError::Transfer { detail: "x".into() }, StatusCode::INTERNAL_SERVER_ERROR),
            (DownloadError::DownloadIncomplete("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (DownloadError::ToolNotFound("yt-dlp".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            let response = HttpError::from(err).into_response();
            assert_eq!(response.status(), status);
        }
    }

    #[test]
    fn validation_message_is_passed_through() {
        let err = HttpError::from(DownloadError::Validation("Invalid URL".into()));
        assert_eq!(err.to_string(), "Invalid URL");
    }

    #[test]
    fn info_errors_are_always_bad_requests() {
        let err = HttpError::from(DownloadError::ToolNotFound("yt-dlp".into())).into_bad_request();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
