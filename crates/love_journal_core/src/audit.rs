//! Best-effort audit logging on a background worker.
//!
//! # Responsibility
//! - Accept audit entries from stores without blocking them.
//! - Persist each entry on its own connection, independent of the mutation
//!   that produced it.
//!
//! # Invariants
//! - `record` never fails and never panics; failures end up in the log only.
//! - Entries are written in submission order by a single worker thread.
//! - `flush` returns only after every earlier entry has been processed.

use crate::db::{ConnectionProvider, DbError};
use crate::model::operation_log::{AuditPayload, AuditTarget, ClientContext, OperationType};
use crate::repo::operation_log_repo::{
    NewOperationLog, OperationLogRepository, SqliteOperationLogRepository,
};
use crate::repo::RepoError;
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::mpsc::{self, Receiver, Sender, SyncSender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

const WORKER_THREAD_NAME: &str = "audit-log";

/// One mutation to be written to the operation log.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditEntry {
    pub operation: OperationType,
    pub target: AuditTarget,
    pub record_id: Option<i64>,
    pub payload: Option<AuditPayload>,
    pub context: Option<ClientContext>,
}

enum Command {
    Record(AuditEntry),
    Flush(SyncSender<()>),
    Shutdown,
}

/// Handle for submitting audit entries; clones share one worker.
#[derive(Clone)]
pub struct AuditLogger {
    tx: Sender<Command>,
    worker: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl AuditLogger {
    /// Starts the worker thread writing through `provider`.
    ///
    /// # Errors
    /// - Returns an error when the OS refuses to spawn the thread.
    pub fn spawn(provider: ConnectionProvider) -> std::io::Result<Self> {
        let (tx, rx) = mpsc::channel();
        let handle = std::thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || run_worker(provider, rx))?;

        info!("event=audit_start module=audit status=ok");
        Ok(Self {
            tx,
            worker: Arc::new(Mutex::new(Some(handle))),
        })
    }

    /// Submits one entry and returns immediately.
    pub fn record(
        &self,
        operation: OperationType,
        target: AuditTarget,
        record_id: Option<i64>,
        payload: Option<AuditPayload>,
        context: Option<&ClientContext>,
    ) {
        if let Some(payload) = payload.as_ref() {
            if payload.operation_type() != operation {
                warn!(
                    "event=audit_submit module=audit status=mismatch operation={} payload_operation={}",
                    operation,
                    payload.operation_type()
                );
            }
        }

        let entry = AuditEntry {
            operation,
            target,
            record_id,
            payload,
            context: context.cloned(),
        };
        if self.tx.send(Command::Record(entry)).is_err() {
            warn!(
                "event=audit_submit module=audit status=dropped operation={} table={} reason=worker_stopped",
                operation,
                target.table_name()
            );
        }
    }

    /// Blocks until all previously submitted entries are processed.
    pub fn flush(&self) {
        let (ack_tx, ack_rx) = mpsc::sync_channel(1);
        if self.tx.send(Command::Flush(ack_tx)).is_err() {
            return;
        }
        let _ = ack_rx.recv();
    }

    /// Processes pending entries, then stops and joins the worker.
    ///
    /// Entries recorded afterwards are dropped with a warning.
    pub fn shutdown(&self) {
        let _ = self.tx.send(Command::Shutdown);
        let handle = match self.worker.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(handle) = handle {
            if handle.join().is_err() {
                error!("event=audit_stop module=audit status=error reason=worker_panicked");
                return;
            }
            info!("event=audit_stop module=audit status=ok");
        }
    }
}

fn run_worker(provider: ConnectionProvider, rx: Receiver<Command>) {
    for command in rx {
        match command {
            Command::Record(entry) => write_entry(&provider, &entry),
            Command::Flush(ack) => {
                let _ = ack.send(());
            }
            Command::Shutdown => break,
        }
    }
}

fn write_entry(provider: &ConnectionProvider, entry: &AuditEntry) {
    match try_write_entry(provider, entry) {
        Ok(log_id) => info!(
            "event=audit_write module=audit status=ok operation={} table={} record_id={} log_id={}",
            entry.operation,
            entry.target.table_name(),
            display_id(entry.record_id),
            log_id
        ),
        Err(err) => error!(
            "event=audit_write module=audit status=error operation={} table={} record_id={} error={}",
            entry.operation,
            entry.target.table_name(),
            display_id(entry.record_id),
            err
        ),
    }
}

fn try_write_entry(provider: &ConnectionProvider, entry: &AuditEntry) -> Result<i64, AuditError> {
    let operation_data = entry
        .payload
        .as_ref()
        .map(AuditPayload::to_storage_text)
        .transpose()?;
    let context = entry.context.clone().unwrap_or_default();

    let conn = provider.acquire()?;
    let repo = SqliteOperationLogRepository::new(&conn);
    let log_id = repo.append(&NewOperationLog {
        operation_type: entry.operation,
        table_name: entry.target.table_name(),
        record_id: entry.record_id,
        operation_data: operation_data.as_deref(),
        ip_address: context.ip_address.as_deref(),
        user_agent: context.user_agent.as_deref(),
    })?;
    Ok(log_id)
}

fn display_id(id: Option<i64>) -> String {
    id.map_or_else(|| "none".to_string(), |id| id.to_string())
}

#[derive(Debug)]
enum AuditError {
    Db(DbError),
    Repo(RepoError),
    Serialize(serde_json::Error),
}

impl Display for AuditError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Serialize(err) => write!(f, "payload serialization failed: {err}"),
        }
    }
}

impl Error for AuditError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::Serialize(err) => Some(err),
        }
    }
}

impl From<DbError> for AuditError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<RepoError> for AuditError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<serde_json::Error> for AuditError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialize(value)
    }
}

#[cfg(test)]
mod tests {
    use super::AuditLogger;
    use crate::config::DatabaseConfig;
    use crate::db::ConnectionProvider;
    use crate::model::operation_log::{AuditPayload, AuditTarget, ClientContext, OperationType};
    use serde_json::json;

    fn provider(dir: &tempfile::TempDir) -> ConnectionProvider {
        let provider = ConnectionProvider::new(DatabaseConfig::new(dir.path().join("audit.db")));
        provider.bootstrap().unwrap();
        provider
    }

    fn count_rows(provider: &ConnectionProvider) -> i64 {
        provider
            .acquire()
            .unwrap()
            .query_row("SELECT COUNT(*) FROM operation_logs;", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn flush_waits_for_submitted_entries() {
        let dir = tempfile::tempdir().unwrap();
        let provider = provider(&dir);
        let audit = AuditLogger::spawn(provider.clone()).unwrap();

        let context = ClientContext {
            ip_address: Some("127.0.0.1".to_string()),
            user_agent: Some("test-agent".to_string()),
        };
        for id in 1..=3 {
            audit.record(
                OperationType::Create,
                AuditTarget::LoveRecords,
                Some(id),
                Some(AuditPayload::CreateSnapshot(json!({ "mood": "happy" }))),
                Some(&context),
            );
        }
        audit.flush();

        assert_eq!(count_rows(&provider), 3);
        audit.shutdown();
    }

    #[test]
    fn record_after_shutdown_is_dropped_without_panicking() {
        let dir = tempfile::tempdir().unwrap();
        let provider = provider(&dir);
        let audit = AuditLogger::spawn(provider.clone()).unwrap();
        audit.shutdown();

        audit.record(
            OperationType::Delete,
            AuditTarget::Anniversaries,
            Some(9),
            None,
            None,
        );
        audit.flush();
        audit.shutdown();

        assert_eq!(count_rows(&provider), 0);
    }

    #[test]
    fn unreachable_storage_is_swallowed() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing").join("audit.db");
        let audit = AuditLogger::spawn(ConnectionProvider::new(DatabaseConfig::new(missing)))
            .unwrap();

        audit.record(OperationType::Update, AuditTarget::LoveRecords, Some(1), None, None);
        audit.flush();
        audit.shutdown();
    }
}
