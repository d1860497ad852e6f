//! Anniversary store.
//!
//! # Responsibility
//! - CRUD over anniversaries with audit capture on mutation.
//! - Answer "what is due within N days" using the configured
//!   `RecurrencePolicy`.

use crate::audit::AuditLogger;
use crate::db::ConnectionProvider;
use crate::model::anniversary::{
    Anniversary, AnniversaryId, AnniversaryPatch, NewAnniversary, UpcomingAnniversary,
};
use crate::model::operation_log::{AuditPayload, AuditTarget, ClientContext, OperationType};
use crate::repo::anniversary_repo::{AnniversaryRepository, SqliteAnniversaryRepository};
use crate::service::upcoming::{select_upcoming, RecurrencePolicy};
use crate::service::{StoreError, StoreResult};
use chrono::{Local, NaiveDate};
use log::info;

const ENTITY: &str = "anniversary";

/// Request-scoped operations over anniversaries.
#[derive(Clone)]
pub struct AnniversaryStore {
    provider: ConnectionProvider,
    audit: AuditLogger,
    policy: RecurrencePolicy,
}

impl AnniversaryStore {
    /// Creates a store using the `CurrentYear` recurrence policy.
    pub fn new(provider: ConnectionProvider, audit: AuditLogger) -> Self {
        Self {
            provider,
            audit,
            policy: RecurrencePolicy::default(),
        }
    }

    pub fn with_recurrence_policy(mut self, policy: RecurrencePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn recurrence_policy(&self) -> RecurrencePolicy {
        self.policy
    }

    /// Lists anniversaries by stored date ascending, optionally by category.
    pub fn list(&self, category: Option<&str>) -> StoreResult<Vec<Anniversary>> {
        let conn = self.provider.acquire()?;
        let repo = SqliteAnniversaryRepository::new(&conn);
        Ok(repo.list_anniversaries(category)?)
    }

    pub fn get(&self, id: AnniversaryId) -> StoreResult<Anniversary> {
        let conn = self.provider.acquire()?;
        let repo = SqliteAnniversaryRepository::new(&conn);
        repo.get_anniversary(id)?
            .ok_or_else(|| StoreError::not_found(ENTITY, id))
    }

    pub fn create(
        &self,
        input: &NewAnniversary,
        context: Option<&ClientContext>,
    ) -> StoreResult<Anniversary> {
        input.validate()?;

        let conn = self.provider.acquire()?;
        let repo = SqliteAnniversaryRepository::new(&conn);
        let id = repo.insert_anniversary(input)?;
        let created = repo
            .get_anniversary(id)?
            .ok_or_else(|| StoreError::not_found(ENTITY, id))?;

        info!("event=anniversary_create module=service status=ok id={id}");
        self.audit.record(
            OperationType::Create,
            AuditTarget::Anniversaries,
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
    /// - `BadRequest` when the patch sets no field or blanks `title`/`category`.
    pub fn update(
        &self,
        id: AnniversaryId,
        patch: &AnniversaryPatch,
        context: Option<&ClientContext>,
    ) -> StoreResult<Anniversary> {
        let conn = self.provider.acquire()?;
        let repo = SqliteAnniversaryRepository::new(&conn);
        let old = repo
            .get_anniversary(id)?
            .ok_or_else(|| StoreError::not_found(ENTITY, id))?;

        if patch.is_empty() {
            return Err(StoreError::empty_patch());
        }
        patch.validate()?;

        repo.update_anniversary(id, patch)?;
        let updated = repo
            .get_anniversary(id)?
            .ok_or_else(|| StoreError::not_found(ENTITY, id))?;

        info!("event=anniversary_update module=service status=ok id={id}");
        let payload = match (serde_json::to_value(&old), serde_json::to_value(patch)) {
            (Ok(old_data), Ok(new_data)) => Some(AuditPayload::UpdateDiff { old_data, new_data }),
            _ => None,
        };
        self.audit.record(
            OperationType::Update,
            AuditTarget::Anniversaries,
            Some(id),
            payload,
            context,
        );
        Ok(updated)
    }

    pub fn delete(&self, id: AnniversaryId, context: Option<&ClientContext>) -> StoreResult<()> {
        let conn = self.provider.acquire()?;
        let repo = SqliteAnniversaryRepository::new(&conn);
        let existing = repo
            .get_anniversary(id)?
            .ok_or_else(|| StoreError::not_found(ENTITY, id))?;

        let deleted = repo.delete_anniversary(id)?;
        info!("event=anniversary_delete module=service status=ok id={id} rows={deleted}");
        self.audit.record(
            OperationType::Delete,
            AuditTarget::Anniversaries,
            Some(id),
            serde_json::to_value(&existing)
                .ok()
                .map(AuditPayload::DeleteSnapshot),
            context,
        );
        Ok(())
    }

    /// Anniversaries due within `window_days` of the local current date.
    pub fn upcoming(&self, window_days: i64) -> StoreResult<Vec<UpcomingAnniversary>> {
        self.upcoming_at(Local::now().date_naive(), window_days)
    }

    /// Anniversaries due within `window_days` of `today`, soonest first.
    pub fn upcoming_at(
        &self,
        today: NaiveDate,
        window_days: i64,
    ) -> StoreResult<Vec<UpcomingAnniversary>> {
        let conn = self.provider.acquire()?;
        let repo = SqliteAnniversaryRepository::new(&conn);
        let anniversaries = repo.list_anniversaries(None)?;
        Ok(select_upcoming(anniversaries, today, window_days, self.policy))
    }
}
