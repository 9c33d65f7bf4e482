//! Client error types.

use flowsync_core::sync::TransportError;
use thiserror::Error;

/// Result type alias for client module.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur during client operations.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Server returned {status}: {message}")]
    ServerError { status: u16, message: String },

    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    #[error("Access forbidden: {resource}")]
    Forbidden { resource: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("ETag mismatch for {filename}: expected {expected}, got {actual}")]
    EtagMismatch {
        filename: String,
        expected: String,
        actual: String,
    },

    #[error("Signing failed: {0}")]
    Signing(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<ClientError> for TransportError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Forbidden { .. } => TransportError::AssignmentRequired,
            ClientError::NotFound { resource } => TransportError::NotFound(resource),
            ClientError::ServerError { status, message } => TransportError::Http { status, message },
            ClientError::EtagMismatch {
                filename,
                expected,
                actual,
            } => TransportError::Integrity {
                filename,
                expected,
                actual,
            },
            ClientError::InvalidResponse(message) => TransportError::InvalidResponse(message),
            ClientError::Json(e) => TransportError::InvalidResponse(e.to_string()),
            ClientError::Io(e) => TransportError::Io(e.to_string()),
            other => TransportError::Network(other.to_string()),
        }
    }
}
