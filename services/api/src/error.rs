//! services/api/src/error.rs
//!
//! Defines the primary error type for the entire API service, and how core
//! session errors are turned into HTTP responses.

use crate::config::ConfigError;
use axum::http::StatusCode;
use doc_chat_core::{RejectReason, SessionError};

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Maps a session error onto the status code the client sees.
pub fn status_for(error: &SessionError) -> StatusCode {
    match error {
        SessionError::InvalidCredentials | SessionError::NotAuthenticated => StatusCode::UNAUTHORIZED,
        SessionError::ReadOnlyCatalog => StatusCode::FORBIDDEN,
        SessionError::NotFound { .. } => StatusCode::NOT_FOUND,
        SessionError::AlreadyAuthenticated | SessionError::Rejected(RejectReason::Pending) => {
            StatusCode::CONFLICT
        }
        SessionError::Validation(_) | SessionError::Rejected(_) => StatusCode::UNPROCESSABLE_ENTITY,
        SessionError::PageCountUnavailable(_) | SessionError::SimulatedBackendFailure(_) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

/// The `(status, message)` pair handlers return on failure.
pub fn reject(error: SessionError) -> (StatusCode, String) {
    (status_for(&error), error.to_string())
}
