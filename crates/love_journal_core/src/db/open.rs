//! Per-operation connection acquisition.
//!
//! # Responsibility
//! - Open a fresh SQLite connection for each logical read or mutation.
//! - Apply the configured busy timeout before handing the connection out.
//!
//! # Invariants
//! - The provider holds no open connection; callers own what they acquire.
//! - Acquisition never creates schema; `ensure_schema` runs once at startup.

use super::schema::ensure_schema;
use super::{DbError, DbResult};
use crate::config::DatabaseConfig;
use log::{debug, error, info};
use rusqlite::Connection;
use std::sync::Arc;
use std::time::Instant;

/// Hands out independent connections to the configured database file.
#[derive(Debug, Clone)]
pub struct ConnectionProvider {
    config: Arc<DatabaseConfig>,
}

impl ConnectionProvider {
    pub fn new(config: DatabaseConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Opens a new connection.
    ///
    /// # Errors
    /// - Returns `DbError::Connection` when the file cannot be opened or the
    ///   busy timeout cannot be applied.
    pub fn acquire(&self) -> DbResult<Connection> {
        let started_at = Instant::now();
        let path = self.config.path();

        let conn = Connection::open(path)
            .and_then(|conn| {
                conn.busy_timeout(self.config.busy_timeout())?;
                Ok(conn)
            })
            .map_err(|err| {
                error!(
                    "event=db_acquire module=db status=error duration_ms={} error_code=db_open_failed error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                DbError::Connection {
                    path: path.to_path_buf(),
                    source: err,
                }
            })?;

        debug!(
            "event=db_acquire module=db status=ok duration_ms={}",
            started_at.elapsed().as_millis()
        );
        Ok(conn)
    }

    /// Acquires a connection and creates any missing relation.
    ///
    /// # Side effects
    /// - Emits `db_bootstrap` logging events with duration and status.
    pub fn bootstrap(&self) -> DbResult<()> {
        let started_at = Instant::now();
        info!(
            "event=db_bootstrap module=db status=start path={}",
            self.config.path().display()
        );

        let conn = self.acquire()?;
        match ensure_schema(&conn, &self.config) {
            Ok(()) => {
                info!(
                    "event=db_bootstrap module=db status=ok duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=db_bootstrap module=db status=error duration_ms={} error_code=db_schema_failed error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }
}
