//! Journal entry store.
//!
//! # Responsibility
//! - CRUD, export and stats over love records.
//! - Capture before/after state for the audit log on every mutation.
//!
//! # Invariants
//! - Created and updated rows are re-read so callers see storage defaults.
//! - Updates only touch the fields set in the patch.

use crate::audit::AuditLogger;
use crate::db::ConnectionProvider;
use crate::model::love_record::{
    LoveRecord, LoveRecordPatch, NewLoveRecord, RecordExport, RecordFilter, RecordId, RecordStats,
};
use crate::model::operation_log::{AuditPayload, AuditTarget, ClientContext, OperationType};
use crate::repo::record_repo::{RecordRepository, SqliteRecordRepository};
use crate::repo::DateOrder;
use crate::service::{StoreError, StoreResult};
use chrono::Local;
use log::info;

const ENTITY: &str = "love record";

/// Request-scoped operations over journal entries.
#[derive(Clone)]
pub struct RecordStore {
    provider: ConnectionProvider,
    audit: AuditLogger,
}

impl RecordStore {
    pub fn new(provider: ConnectionProvider, audit: AuditLogger) -> Self {
        Self { provider, audit }
    }

    /// Lists entries matching every supplied filter, newest date first.
    pub fn list(&self, filter: &RecordFilter) -> StoreResult<Vec<LoveRecord>> {
        let conn = self.provider.acquire()?;
        let repo = SqliteRecordRepository::new(&conn);
        Ok(repo.list_records(filter, DateOrder::Descending)?)
    }

    pub fn get(&self, id: RecordId) -> StoreResult<LoveRecord> {
        let conn = self.provider.acquire()?;
        let repo = SqliteRecordRepository::new(&conn);
        repo.get_record(id)?
            .ok_or_else(|| StoreError::not_found(ENTITY, id))
    }

    /// Inserts a new entry and returns it as stored.
    ///
    /// # Errors
    /// - `BadRequest` when a required field is blank.
    pub fn create(
        &self,
        input: &NewLoveRecord,
        context: Option<&ClientContext>,
    ) -> StoreResult<LoveRecord> {
        input.validate()?;

        let conn = self.provider.acquire()?;
        let repo = SqliteRecordRepository::new(&conn);
        let id = repo.insert_record(input)?;
        let created = repo
            .get_record(id)?
            .ok_or_else(|| StoreError::not_found(ENTITY, id))?;

        info!("event=record_create module=service status=ok id={id}");
        self.audit.record(
            OperationType::Create,
            AuditTarget::LoveRecords,
            Some(id),
            serde_json::to_value(input)
                .ok()
                .map(AuditPayload::CreateSnapshot),
            context,
        );
        Ok(created)
    }

    /// Applies a partial update.
    ///
    /// # Errors
    /// - `NotFound` when `id` does not exist.
    /// - `BadRequest` when the patch sets no field or blanks a required one.
    pub fn update(
        &self,
        id: RecordId,
        patch: &LoveRecordPatch,
        context: Option<&ClientContext>,
    ) -> StoreResult<LoveRecord> {
        self.update_interleaved(id, patch, context, || {})
    }

    /// `update` running `between` after the existence read and before the write.
    pub(crate) fn update_interleaved(
        &self,
        id: RecordId,
        patch: &LoveRecordPatch,
        context: Option<&ClientContext>,
        between: impl FnOnce(),
    ) -> StoreResult<LoveRecord> {
        let conn = self.provider.acquire()?;
        let repo = SqliteRecordRepository::new(&conn);
        let old = repo
            .get_record(id)?
            .ok_or_else(|| StoreError::not_found(ENTITY, id))?;

        if patch.is_empty() {
            return Err(StoreError::empty_patch());
        }
        patch.validate()?;

        between();
        repo.update_record(id, patch)?;
        let updated = repo
            .get_record(id)?
            .ok_or_else(|| StoreError::not_found(ENTITY, id))?;

        info!("event=record_update module=service status=ok id={id}");
        let payload = match (serde_json::to_value(&old), serde_json::to_value(patch)) {
            (Ok(old_data), Ok(new_data)) => Some(AuditPayload::UpdateDiff { old_data, new_data }),
            _ => None,
        };
        self.audit.record(
            OperationType::Update,
            AuditTarget::LoveRecords,
            Some(id),
            payload,
            context,
        );
        Ok(updated)
    }

    /// Deletes an entry after snapshotting it for the audit log.
    ///
    /// A row removed concurrently between the read and the delete still
    /// reports success.
    pub fn delete(&self, id: RecordId, context: Option<&ClientContext>) -> StoreResult<()> {
        self.delete_interleaved(id, context, || {})
    }

    /// `delete` running `between` after the snapshot read and before the delete.
    pub(crate) fn delete_interleaved(
        &self,
        id: RecordId,
        context: Option<&ClientContext>,
        between: impl FnOnce(),
    ) -> StoreResult<()> {
        let conn = self.provider.acquire()?;
        let repo = SqliteRecordRepository::new(&conn);
        let existing = repo
            .get_record(id)?
            .ok_or_else(|| StoreError::not_found(ENTITY, id))?;

        between();
        let deleted = repo.delete_record(id)?;
        info!("event=record_delete module=service status=ok id={id} rows={deleted}");
        self.audit.record(
            OperationType::Delete,
            AuditTarget::LoveRecords,
            Some(id),
            serde_json::to_value(&existing)
                .ok()
                .map(AuditPayload::DeleteSnapshot),
            context,
        );
        Ok(())
    }

    /// Exports entries oldest first, filtered the same way as `list`.
    pub fn export(&self, category: Option<&str>) -> StoreResult<RecordExport> {
        let category_filter = category.map(str::to_string);
        let filter = RecordFilter {
            category: category_filter.clone(),
            mood: None,
        };

        let conn = self.provider.acquire()?;
        let repo = SqliteRecordRepository::new(&conn);
        let records = repo.list_records(&filter, DateOrder::Ascending)?;

        Ok(RecordExport {
            export_time: Local::now().naive_local(),
            total_records: records.len(),
            category_filter,
            records,
        })
    }

    pub fn stats(&self) -> StoreResult<RecordStats> {
        let conn = self.provider.acquire()?;
        let repo = SqliteRecordRepository::new(&conn);
        Ok(RecordStats {
            total_records: repo.count_records()?,
            category_stats: repo.category_counts()?,
            mood_stats: repo.mood_counts()?,
            latest_record: repo.latest_record()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::RecordStore;
    use crate::audit::AuditLogger;
    use crate::config::DatabaseConfig;
    use crate::db::ConnectionProvider;
    use crate::model::love_record::{LoveRecordPatch, NewLoveRecord};
    use crate::model::operation_log::{AuditPayload, OperationLogQuery, OperationType};
    use crate::repo::operation_log_repo::{OperationLogRepository, SqliteOperationLogRepository};
    use crate::service::StoreError;
    use chrono::NaiveDate;

    fn setup(dir: &tempfile::TempDir) -> (ConnectionProvider, AuditLogger, RecordStore) {
        let provider = ConnectionProvider::new(DatabaseConfig::new(dir.path().join("journal.db")));
        provider.bootstrap().unwrap();
        let audit = AuditLogger::spawn(provider.clone()).unwrap();
        let store = RecordStore::new(provider.clone(), audit.clone());
        (provider, audit, store)
    }

    fn entry(mood: &str) -> NewLoveRecord {
        NewLoveRecord {
            category: "date".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 2, 14).unwrap(),
            description: "dinner".to_string(),
            mood: mood.to_string(),
            timestamp: 1,
        }
    }

    fn latest_payload(provider: &ConnectionProvider, operation: OperationType) -> AuditPayload {
        let conn = provider.acquire().unwrap();
        let entries = SqliteOperationLogRepository::new(&conn)
            .list(&OperationLogQuery::default())
            .unwrap();
        let entry = entries
            .into_iter()
            .find(|entry| entry.operation_type == operation)
            .unwrap();
        entry.operation_data.unwrap()
    }

    #[test]
    fn delete_succeeds_when_row_was_removed_after_the_read() {
        let dir = tempfile::tempdir().unwrap();
        let (provider, audit, store) = setup(&dir);
        let created = store.create(&entry("happy"), None).unwrap();

        let other = provider.acquire().unwrap();
        store
            .delete_interleaved(created.id, None, || {
                other
                    .execute("DELETE FROM love_records WHERE id = ?1;", [created.id])
                    .unwrap();
            })
            .unwrap();

        assert!(matches!(
            store.get(created.id).unwrap_err(),
            StoreError::NotFound { .. }
        ));
        audit.flush();
        match latest_payload(&provider, OperationType::Delete) {
            AuditPayload::DeleteSnapshot(value) => assert_eq!(value["id"], created.id),
            other => panic!("unexpected payload: {other:?}"),
        }
    }

    #[test]
    fn update_audit_keeps_the_snapshot_read_before_a_concurrent_write() {
        let dir = tempfile::tempdir().unwrap();
        let (provider, audit, store) = setup(&dir);
        let created = store.create(&entry("happy"), None).unwrap();

        let other = provider.acquire().unwrap();
        let patch = LoveRecordPatch {
            description: Some("late dinner".to_string()),
            ..LoveRecordPatch::default()
        };
        let updated = store
            .update_interleaved(created.id, &patch, None, || {
                other
                    .execute(
                        "UPDATE love_records SET mood = 'sad' WHERE id = ?1;",
                        [created.id],
                    )
                    .unwrap();
            })
            .unwrap();

        assert_eq!(updated.mood, "sad");
        assert_eq!(updated.description, "late dinner");

        audit.flush();
        match latest_payload(&provider, OperationType::Update) {
            AuditPayload::UpdateDiff { old_data, new_data } => {
                assert_eq!(old_data["mood"], "happy");
                assert_eq!(new_data["description"], "late dinner");
            }
            other => panic!("unexpected payload: {other:?}"),
        }
    }

    #[test]
    fn update_of_row_removed_after_the_read_reports_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let (provider, _audit, store) = setup(&dir);
        let created = store.create(&entry("happy"), None).unwrap();

        let other = provider.acquire().unwrap();
        let patch = LoveRecordPatch {
            mood: Some("calm".to_string()),
            ..LoveRecordPatch::default()
        };
        let err = store
            .update_interleaved(created.id, &patch, None, || {
                other
                    .execute("DELETE FROM love_records WHERE id = ?1;", [created.id])
                    .unwrap();
            })
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }
}
