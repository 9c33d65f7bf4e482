//! Errors of the local response store.

use thiserror::Error;

/// Failure of a form instance, response, transmission or form row operation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// A lookup or update by id matched no row.
    #[error("no {entity_type} with id {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },
    #[error("{entity_type} {id} is already stored")]
    AlreadyExists {
        entity_type: &'static str,
        id: String,
    },
    /// A status change outside the lifecycle, e.g. editing a sent form instance.
    #[error("{entity_type} cannot go from {from} to {to}")]
    InvalidTransition {
        entity_type: &'static str,
        from: String,
        to: String,
    },
    #[error("database unavailable: {0}")]
    ConnectionFailed(String),
    #[error("statement failed: {0}")]
    QueryFailed(String),
    /// A row was rejected by a constraint or could not be read back.
    #[error("bad row: {0}")]
    InvalidData(String),
}

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, RepositoryError>;
