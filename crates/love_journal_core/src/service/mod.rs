//! Store services: one connection per operation, audit on mutation.
//!
//! # Responsibility
//! - Turn repository calls into request-level operations with
//!   `NotFound`/`BadRequest` semantics.
//! - Submit an audit entry after every successful create/update/delete.
//!
//! # Invariants
//! - Stores never catch connection or storage failures of their own calls.
//! - Audit submission cannot fail the operation that triggered it.
//! - Compound sequences (read-then-write, write-then-reread) are not atomic.

use crate::db::DbError;
use crate::model::ValidationError;
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod anniversary_service;
pub mod operation_log_service;
pub mod record_service;
pub mod upcoming;

pub type StoreResult<T> = Result<T, StoreError>;

/// Request-level failure taxonomy surfaced to the transport.
#[derive(Debug)]
pub enum StoreError {
    /// Storage is unreachable; fatal for the current operation.
    Connection(DbError),
    /// Referenced row does not exist.
    NotFound { entity: &'static str, id: i64 },
    /// Well-formed request that cannot be applied.
    BadRequest(String),
    /// Any other failure while running a statement.
    Storage(RepoError),
}

impl StoreError {
    pub(crate) fn not_found(entity: &'static str, id: i64) -> Self {
        Self::NotFound { entity, id }
    }

    pub(crate) fn empty_patch() -> Self {
        Self::BadRequest("no fields provided to update".to_string())
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connection(err) => write!(f, "database connection failed: {err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::BadRequest(message) => write!(f, "{message}"),
            Self::Storage(err) => write!(f, "storage error: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Connection(err) => Some(err),
            Self::Storage(err) => Some(err),
            Self::NotFound { .. } | Self::BadRequest(_) => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        match value {
            err @ DbError::Connection { .. } => Self::Connection(err),
            other => Self::Storage(RepoError::Db(other)),
        }
    }
}

impl From<RepoError> for StoreError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Db(err @ DbError::Connection { .. }) => Self::Connection(err),
            other => Self::Storage(other),
        }
    }
}

impl From<ValidationError> for StoreError {
    fn from(value: ValidationError) -> Self {
        Self::BadRequest(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::StoreError;
    use crate::db::DbError;
    use crate::repo::RepoError;

    #[test]
    fn connection_failures_keep_their_class_through_repo_errors() {
        let err = DbError::Connection {
            path: "/nowhere/db".into(),
            source: rusqlite::Error::QueryReturnedNoRows,
        };
        let store_err = StoreError::from(RepoError::Db(err));
        assert!(matches!(store_err, StoreError::Connection(_)));
    }

    #[test]
    fn statement_failures_become_storage_errors() {
        let store_err = StoreError::from(DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows));
        assert!(matches!(store_err, StoreError::Storage(_)));
        assert!(store_err.to_string().starts_with("storage error"));
    }
}
