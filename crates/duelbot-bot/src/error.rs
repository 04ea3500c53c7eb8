//! Duelbot — startup and HTTP error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use duelbot_core::error::DomainError;
use serde::Serialize;
use thiserror::Error;

/// Startup and runtime errors for the bot process.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required environment variable or config file is missing or invalid.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The pool could not connect or a startup query failed.
    #[error("database unavailable: {0}")]
    Database(#[from] sqlx::Error),

    /// Schema migration failed.
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A domain operation failed during startup.
    #[error("startup failed: {0}")]
    Domain(#[from] DomainError),

    /// The listener could not bind or serve.
    #[error("http server failed: {0}")]
    Server(#[from] std::io::Error),
}

/// Error payload of the chat bridge.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Stable error code, e.g. `validation_error`.
    pub error: &'static str,
    /// Display text of the underlying error.
    pub message: String,
}

/// A `DomainError` on its way out of an HTTP handler.
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = match &self.0 {
            DomainError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            DomainError::UserNotFound(_) => (StatusCode::NOT_FOUND, "user_not_found"),
            DomainError::UnknownStat(_) => (StatusCode::NOT_FOUND, "unknown_stat"),
            DomainError::InsufficientFreePoints { .. } => {
                (StatusCode::CONFLICT, "insufficient_free_points")
            }
            DomainError::Transport(_) => (StatusCode::SERVICE_UNAVAILABLE, "transport_unavailable"),
            DomainError::Configuration(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "configuration_error")
            }
            DomainError::Persistence(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "persistence_error")
            }
        };

        let body = ErrorBody {
            error: error_code,
            message: self.0.to_string(),
        };

        (status, Json(body)).into_response()
    }
}
