//! Mapping from crate errors to HTTP responses.

use crate::errors::Error;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

/// Body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable status literal
    pub status: &'static str,
    /// Human-readable description
    pub error: String,
}

impl Error {
    /// HTTP status code and wire literal for this error.
    #[must_use]
    pub const fn http_status(&self) -> (StatusCode, &'static str) {
        match self {
            Self::MissingInput { .. } => (StatusCode::BAD_REQUEST, "MISSING_INPUT"),
            Self::InvalidInput { .. } => (StatusCode::BAD_REQUEST, "INVALID_INPUT"),
            Self::LicenseNotFound { .. } => (StatusCode::NOT_FOUND, "INVALID"),
            Self::DuplicateKey { .. } | Self::HwidInUse { .. } => {
                (StatusCode::CONFLICT, "CONFLICT")
            }
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::CorruptRecord { .. }
            | Self::Database(_)
            | Self::Config { .. }
            | Self::Io(_)
            | Self::EnvVar(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (code, status) = self.http_status();
        let message = if code == StatusCode::INTERNAL_SERVER_ERROR {
            error!("Request failed: {}", self);
            "internal server error".to_string()
        } else {
            self.to_string()
        };

        (
            code,
            Json(ErrorBody {
                status,
                error: message,
            }),
        )
            .into_response()
    }
}
