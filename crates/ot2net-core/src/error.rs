//! Unified error types for ot2net Core.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use ot2net_types::{AuditError, ConfigError, UpstreamError};
use serde::Serialize;
use thiserror::Error;

/// Main error type for all gateway operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum AppError {
    /// Database operation failed (SQLite).
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Network request failed (HTTP client).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// File system I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration loading or validation failed.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Audit store failure.
    #[error("Audit error: {0}")]
    Audit(#[from] AuditError),

    /// Caller sent something we cannot process.
    #[error("{0}")]
    InvalidRequest(String),

    /// AI vendor call failed after the retry policy gave up.
    #[error("Erro ao processar com {vendor} API: {message}")]
    Upstream {
        /// Vendor display name
        vendor: String,
        /// Final error detail
        message: String,
    },

    /// Unclassified error with message.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.to_string().as_str())
    }
}

/// Result type alias for gateway operations.
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Wrap the last upstream error into the uniform vendor failure.
    pub fn upstream(vendor: &str, err: &UpstreamError) -> Self {
        Self::Upstream { vendor: vendor.to_string(), message: err.message.clone() }
    }

    /// HTTP status this error maps to. Upstream failures are always 500.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::Database(_)
            | Self::Network(_)
            | Self::Io(_)
            | Self::Json(_)
            | Self::Config(_)
            | Self::Audit(_)
            | Self::Upstream { .. }
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<String> for AppError {
    fn from(s: String) -> Self {
        AppError::Internal(s)
    }
}

impl From<&str> for AppError {
    fn from(s: &str) -> Self {
        AppError::Internal(s.to_string())
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorDetail {
    message: String,
    status_code: u16,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        tracing::error!(status = status.as_u16(), error = %self, "Request error");
        let body = ErrorBody {
            error: ErrorDetail { message: self.to_string(), status_code: status.as_u16() },
        };
        (status, Json(body)).into_response()
    }
}
