//! Domain-level error types.

use std::fmt::Display;

use thiserror::Error;

/// Domain errors - business logic failures.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: &'static str, id: i64 },

    /// A lookup miss reported by storage without entity context.
    #[error("Record not found")]
    RecordNotFound,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Duplicate entity: {0}")]
    Duplicate(String),

    #[error("Unauthorized access")]
    Unauthorized,

    #[error("Operation not permitted")]
    Forbidden,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Repository-level errors.
///
/// Adapters surface exactly two kinds: a lookup miss, and everything else
/// tagged with the operation that failed.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Record not found")]
    NotFound,

    #[error("{context}: {message}")]
    Storage {
        context: &'static str,
        message: String,
    },
}

impl RepoError {
    /// Wrap an underlying execution error with the name of the failing operation.
    pub fn storage(context: &'static str, err: impl Display) -> Self {
        RepoError::Storage {
            context,
            message: err.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, RepoError::NotFound)
    }
}

impl From<RepoError> for DomainError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound => DomainError::RecordNotFound,
            RepoError::Storage { .. } => DomainError::Internal(err.to_string()),
        }
    }
}
