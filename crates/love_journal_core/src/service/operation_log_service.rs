//! Read-only access to the operation log.

use crate::db::ConnectionProvider;
use crate::model::operation_log::{OperationLogEntry, OperationLogQuery, OperationLogStats};
use crate::repo::operation_log_repo::{OperationLogRepository, SqliteOperationLogRepository};
use crate::service::StoreResult;

/// Listing and stats over audit rows. Writing belongs to `AuditLogger`.
#[derive(Clone)]
pub struct OperationLogService {
    provider: ConnectionProvider,
}

impl OperationLogService {
    pub fn new(provider: ConnectionProvider) -> Self {
        Self { provider }
    }

    /// Newest entries first, paged by `query.limit`/`query.offset`.
    pub fn list(&self, query: &OperationLogQuery) -> StoreResult<Vec<OperationLogEntry>> {
        let conn = self.provider.acquire()?;
        let repo = SqliteOperationLogRepository::new(&conn);
        Ok(repo.list(query)?)
    }

    pub fn stats(&self) -> StoreResult<OperationLogStats> {
        let conn = self.provider.acquire()?;
        let repo = SqliteOperationLogRepository::new(&conn);
        Ok(repo.stats()?)
    }
}
