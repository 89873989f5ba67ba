//! Database error types for mp-db.

use mp_status::StoreError;
use thiserror::Error;

use crate::retry::is_lock_contention;

/// Errors from database operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// A SQL query failed.
    #[error("Query failed: {0}")]
    Query(String),

    /// Schema migration failed.
    #[error("Migration failed: {0}")]
    Migration(String),

    /// Expected a result row but none was returned.
    #[error("No result returned")]
    NoResult,

    /// Invalid state encountered (e.g., bad data in DB).
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Another writer holds the database lock.
    #[error("Database busy: {0}")]
    Busy(String),

    /// Underlying libSQL error.
    #[error("libSQL error: {0}")]
    LibSql(libsql::Error),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<libsql::Error> for DatabaseError {
    fn from(error: libsql::Error) -> Self {
        if is_lock_contention(&error) {
            Self::Busy(error.to_string())
        } else {
            Self::LibSql(error)
        }
    }
}

impl From<DatabaseError> for StoreError {
    fn from(error: DatabaseError) -> Self {
        match error {
            DatabaseError::Busy(msg) => Self::Conflict(msg),
            other => Self::Backend(other.into()),
        }
    }
}
