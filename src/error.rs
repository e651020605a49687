use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use midi_summary::MidiError;

/// Every way an analysis request can fail.
///
/// The three analysis kinds are all reported as client errors; only the
/// transport body limit has its own status.
#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error("Invalid file format: only .mid and .midi files are accepted (got '{filename}')")]
    Validation { filename: String },

    #[error("Could not parse MIDI file: {0}")]
    Parse(#[from] MidiError),

    #[error("Unexpected error while analyzing upload: {0}")]
    Unexpected(String),

    #[error("Upload too large: {0}")]
    PayloadTooLarge(String),
}

impl AnalyzeError {
    pub fn unexpected(message: impl Into<String>) -> Self {
        AnalyzeError::Unexpected(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AnalyzeError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AnalyzeError::Validation { .. }
            | AnalyzeError::Parse(_)
            | AnalyzeError::Unexpected(_) => StatusCode::BAD_REQUEST,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    detail: String,
}

impl IntoResponse for AnalyzeError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            detail: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

impl From<axum::extract::multipart::MultipartError> for AnalyzeError {
    fn from(err: axum::extract::multipart::MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AnalyzeError::PayloadTooLarge(err.body_text())
        } else {
            AnalyzeError::unexpected(err.body_text())
        }
    }
}

impl From<axum::extract::multipart::MultipartRejection> for AnalyzeError {
    fn from(rejection: axum::extract::multipart::MultipartRejection) -> Self {
        AnalyzeError::unexpected(rejection.body_text())
    }
}
