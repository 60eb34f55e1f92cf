//! Database error types.

use thiserror::Error;

/// SQLite result codes that signal lock contention between connections.
const SQLITE_BUSY: &str = "5";
const SQLITE_LOCKED: &str = "6";
const SQLITE_BUSY_SNAPSHOT: &str = "517";
const SQLITE_LOCKED_SHAREDCACHE: &str = "262";

/// Errors that can occur during database operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// SQLx error (connection, query, etc.)
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Migration error
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Record not found
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Record already exists
    #[error("{entity} already exists: {id}")]
    AlreadyExists { entity: &'static str, id: String },

    /// A concurrent writer touched the same rows; the unit was rolled back.
    #[error("conflicting write on {entity}: {id}")]
    Conflict { entity: &'static str, id: String },
}

impl DatabaseError {
    /// Reclassify an error raised inside an atomic unit.
    ///
    /// Lock contention and uniqueness clashes become [`DatabaseError::Conflict`];
    /// everything else is returned unchanged.
    pub fn contended(self, entity: &'static str, id: &str) -> Self {
        let contended = match &self {
            DatabaseError::AlreadyExists { .. } => true,
            DatabaseError::Sqlx(sqlx::Error::Database(db_err)) => {
                db_err.is_unique_violation()
                    || matches!(
                        db_err.code().as_deref(),
                        Some(SQLITE_BUSY)
                            | Some(SQLITE_LOCKED)
                            | Some(SQLITE_BUSY_SNAPSHOT)
                            | Some(SQLITE_LOCKED_SHAREDCACHE)
                    )
            }
            _ => false,
        };

        if contended {
            DatabaseError::Conflict {
                entity,
                id: id.to_string(),
            }
        } else {
            self
        }
    }

    /// Whether this error is a [`DatabaseError::Conflict`].
    pub fn is_conflict(&self) -> bool {
        matches!(self, DatabaseError::Conflict { .. })
    }
}

/// Result type for database operations.
pub type Result<T> = std::result::Result<T, DatabaseError>;
