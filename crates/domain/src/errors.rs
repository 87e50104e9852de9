//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for ProjectFlow
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum ProjectFlowError {
    /// Malformed or inconsistent input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Authenticated, but not allowed to perform the operation
    #[error("Permission denied: {0}")]
    Permission(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Well-formed request that would break an invariant
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Missing/invalid credentials or OAuth state mismatch
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Calendar provider call failed or timed out
    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ProjectFlowError {
    /// The message without the category prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::Validation(msg)
            | Self::Permission(msg)
            | Self::NotFound(msg)
            | Self::InvalidOperation(msg)
            | Self::Authentication(msg)
            | Self::ExternalService(msg)
            | Self::Database(msg)
            | Self::Config(msg)
            | Self::Internal(msg) => msg,
        }
    }

    /// Errors a caller can expect to clear by retrying the same request.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ExternalService(_) | Self::Database(_))
    }
}

/// Result type alias for ProjectFlow operations
pub type Result<T> = std::result::Result<T, ProjectFlowError>;
