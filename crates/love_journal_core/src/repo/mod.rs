//! Repository layer: SQL over one borrowed connection.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts per relation.
//! - Keep SQL text, parameter binding and row decoding out of the stores.
//!
//! # Invariants
//! - Every value reaches SQLite through parameter binding.
//! - Read paths reject corrupt persisted state instead of masking it
//!   (audit payloads excepted, see `AuditPayload::decode`).

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod anniversary_repo;
pub mod operation_log_repo;
pub mod query;
pub mod record_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// A persisted row holds a value the model cannot represent.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Row ordering by calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateOrder {
    /// Newest first; equal dates by descending id.
    Descending,
    /// Oldest first; equal dates by ascending id.
    Ascending,
}

impl DateOrder {
    pub(crate) fn as_sql(self) -> &'static str {
        match self {
            Self::Descending => " ORDER BY date DESC, id DESC",
            Self::Ascending => " ORDER BY date ASC, id ASC",
        }
    }
}

pub(crate) fn parse_bool(value: i64, column: &str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean value `{other}` in {column}"
        ))),
    }
}
