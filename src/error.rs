//! Error taxonomy shared by the process, probe, transcode and pipeline layers.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("command must not be empty")]
    InvalidCommand,

    #[error("failed to launch shell: {0}")]
    Launch(#[source] std::io::Error),

    #[error("command exited with code {code}: {command}")]
    CommandFailed { code: i32, command: String },

    #[error("command timed out: {command}")]
    CommandTimeout { command: String },

    #[error("unexpected probe output: {0}")]
    Parse(String),

    #[error("file name has no recognizable suffix")]
    InvalidFilename,

    #[error("path contains parent directory segments")]
    PathTraversal,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Stable numeric code reported in the response envelope.
    pub fn code(&self) -> u32 {
        match self {
            AppError::InvalidFilename | AppError::PathTraversal | AppError::InvalidCommand => 600,
            AppError::CommandTimeout { .. } => 504,
            _ => 500,
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidFilename | AppError::PathTraversal | AppError::InvalidCommand => {
                StatusCode::BAD_REQUEST
            }
            AppError::CommandTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = crate::http::ApiResponse::<()>::error(self.code(), self.to_string());
        (self.status(), Json(body)).into_response()
    }
}
