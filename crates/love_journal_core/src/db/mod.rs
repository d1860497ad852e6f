//! SQLite storage bootstrap: schema creation and connection acquisition.
//!
//! # Responsibility
//! - Open one short-lived SQLite connection per logical operation.
//! - Create the journal relations idempotently at process start.
//!
//! # Invariants
//! - Schema creation never touches existing rows.
//! - Connections are owned values; dropping one always releases it.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

mod open;
pub mod schema;

pub use open::ConnectionProvider;
pub use schema::{ensure_schema, TABLE_NAMES};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    /// Statement-level failure on an already open connection.
    Sqlite(rusqlite::Error),
    /// The database file could not be opened or configured.
    Connection {
        path: PathBuf,
        source: rusqlite::Error,
    },
    /// Creating one of the journal relations failed.
    Schema {
        table: &'static str,
        source: rusqlite::Error,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::Connection { path, source } => {
                write!(f, "failed to connect to `{}`: {source}", path.display())
            }
            Self::Schema { table, source } => {
                write!(f, "failed to create table `{table}`: {source}")
            }
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::Connection { source, .. } => Some(source),
            Self::Schema { source, .. } => Some(source),
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
