//! Error types for mark-db.
//!
//! [`DatabaseError`] is the storage-failure kind: connectivity, bad rows, or
//! constraint violations other than the idempotent-insert case.
//! [`MarkError`] is what relation operations return: either the resolver's
//! [`AuthorizationError`] unchanged, or a storage failure.

use mark_core::{AuthorizationError, ErrorKind};
use thiserror::Error;

/// Errors from database operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// A SQL query failed or returned malformed data.
    #[error("Query failed: {0}")]
    Query(String),

    /// Schema migration failed.
    #[error("Migration failed: {0}")]
    Migration(String),

    /// Expected a result row but none was returned.
    #[error("No result returned")]
    NoResult,

    /// Invalid state encountered (e.g., unusable lookup configuration).
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Underlying libSQL error.
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),
}

/// Errors from relation operations.
#[derive(Debug, Error)]
pub enum MarkError {
    /// The resolver rejected the request; nothing was read or written.
    #[error(transparent)]
    Unauthorized(#[from] AuthorizationError),

    /// The relation store failed.
    #[error(transparent)]
    Storage(#[from] DatabaseError),
}

impl MarkError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthorized(e) => e.kind(),
            Self::Storage(_) => ErrorKind::StorageFailure,
        }
    }

    /// Caller-input errors must be surfaced, never retried.
    #[must_use]
    pub const fn is_caller_error(&self) -> bool {
        self.kind().is_caller_error()
    }
}

impl From<libsql::Error> for MarkError {
    fn from(error: libsql::Error) -> Self {
        Self::Storage(DatabaseError::LibSql(error))
    }
}
