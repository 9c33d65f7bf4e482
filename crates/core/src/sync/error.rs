use thiserror::Error;

use crate::form::ParseError;
use crate::storage::RepositoryError;

/// Errors raised by the network seams.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Device is not assigned to this survey")]
    AssignmentRequired,
    #[error("Resource not found: {0}")]
    NotFound(String),
    #[error("Server returned {status}: {message}")]
    Http { status: u16, message: String },
    #[error("Network error: {0}")]
    Network(String),
    #[error("Integrity check failed for {filename}: expected {expected}, got {actual}")]
    Integrity {
        filename: String,
        expected: String,
        actual: String,
    },
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("IO error: {0}")]
    Io(String),
}

/// Result type for network operations.
pub type TransportResult<T> = std::result::Result<T, TransportError>;

/// Errors raised by the sync use cases.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SyncError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("IO error: {0}")]
    Io(String),
}

impl From<std::io::Error> for SyncError {
    fn from(err: std::io::Error) -> Self {
        SyncError::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_error_display() {
        assert_eq!(
            TransportError::AssignmentRequired.to_string(),
            "Device is not assigned to this survey"
        );
        assert_eq!(
            TransportError::Http {
                status: 500,
                message: "boom".to_string()
            }
            .to_string(),
            "Server returned 500: boom"
        );
        assert_eq!(
            TransportError::Integrity {
                filename: "a.zip".to_string(),
                expected: "abc".to_string(),
                actual: "def".to_string(),
            }
            .to_string(),
            "Integrity check failed for a.zip: expected abc, got def"
        );
    }

    #[test]
    fn test_sync_error_display() {
        assert_eq!(
            SyncError::MissingParameter("survey_id").to_string(),
            "Missing required parameter: survey_id"
        );
        assert_eq!(
            SyncError::from(TransportError::Network("timeout".to_string())).to_string(),
            "Network error: timeout"
        );
    }
}
