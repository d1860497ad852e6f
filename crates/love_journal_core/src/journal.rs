//! Process-level wiring of the core.
//!
//! # Responsibility
//! - Run schema bootstrap once, start the audit worker, build the stores.
//!
//! # Invariants
//! - No store is handed out before `ensure_schema` succeeded.
//! - All stores share one provider and one audit worker.

use crate::audit::AuditLogger;
use crate::config::DatabaseConfig;
use crate::db::{ConnectionProvider, DbError};
use crate::service::anniversary_service::AnniversaryStore;
use crate::service::operation_log_service::OperationLogService;
use crate::service::record_service::RecordStore;
use crate::service::upcoming::RecurrencePolicy;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Startup failure of the core.
#[derive(Debug)]
pub enum JournalError {
    Db(DbError),
    AuditWorker(std::io::Error),
}

impl Display for JournalError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "database initialization failed: {err}"),
            Self::AuditWorker(err) => write!(f, "failed to start audit worker: {err}"),
        }
    }
}

impl Error for JournalError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::AuditWorker(err) => Some(err),
        }
    }
}

impl From<DbError> for JournalError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

/// Ready-to-use stores over one database.
#[derive(Clone)]
pub struct Journal {
    pub records: RecordStore,
    pub anniversaries: AnniversaryStore,
    pub operation_logs: OperationLogService,
    audit: AuditLogger,
}

impl Journal {
    /// Bootstraps the schema and starts the audit worker.
    ///
    /// # Errors
    /// - `JournalError::Db` when the database cannot be opened or the schema
    ///   cannot be created.
    pub fn open(config: DatabaseConfig, policy: RecurrencePolicy) -> Result<Self, JournalError> {
        let provider = ConnectionProvider::new(config);
        provider.bootstrap()?;
        let audit = AuditLogger::spawn(provider.clone()).map_err(JournalError::AuditWorker)?;

        Ok(Self {
            records: RecordStore::new(provider.clone(), audit.clone()),
            anniversaries: AnniversaryStore::new(provider.clone(), audit.clone())
                .with_recurrence_policy(policy),
            operation_logs: OperationLogService::new(provider),
            audit,
        })
    }

    pub fn audit(&self) -> &AuditLogger {
        &self.audit
    }

    /// Drains pending audit entries and stops the worker.
    pub fn shutdown(&self) {
        self.audit.shutdown();
    }
}
