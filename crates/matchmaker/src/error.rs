//! Error types for matchmaker operations.

use database::DatabaseError;
use thiserror::Error;

use crate::validation::ValidationError;

/// Errors that can occur while matching users or managing sessions.
#[derive(Debug, Error)]
pub enum MatchmakerError {
    /// A required field was missing or malformed.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A referenced user or session does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A concurrent request consumed the same rows first.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Storage failure. Nothing from the failed operation was committed.
    #[error("internal error: {0}")]
    Internal(DatabaseError),
}

impl From<DatabaseError> for MatchmakerError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound { entity, id } => MatchmakerError::NotFound { entity, id },
            DatabaseError::Conflict { .. } => MatchmakerError::Conflict(err.to_string()),
            other => MatchmakerError::Internal(other),
        }
    }
}

/// Result type for matchmaker operations.
pub type Result<T> = std::result::Result<T, MatchmakerError>;
