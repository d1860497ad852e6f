//! Core domain logic for the love journal.
//! This crate is the single source of truth for storage and business invariants.

pub mod audit;
pub mod config;
pub mod db;
pub mod journal;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use audit::AuditLogger;
pub use config::DatabaseConfig;
pub use db::{ConnectionProvider, DbError};
pub use journal::{Journal, JournalError};
pub use logging::{default_log_level, init_logging, logging_status, LogTarget};
pub use model::anniversary::{
    Anniversary, AnniversaryId, AnniversaryPatch, NewAnniversary, UpcomingAnniversary,
};
pub use model::love_record::{
    LoveRecord, LoveRecordPatch, NewLoveRecord, RecordExport, RecordFilter, RecordId,
    RecordStats,
};
pub use model::operation_log::{
    AuditPayload, AuditTarget, ClientContext, OperationLogEntry, OperationLogQuery,
    OperationLogStats, OperationType,
};
pub use model::ValidationError;
pub use repo::{RepoError, RepoResult};
pub use service::anniversary_service::AnniversaryStore;
pub use service::operation_log_service::OperationLogService;
pub use service::record_service::RecordStore;
pub use service::upcoming::{RecurrencePolicy, DEFAULT_WINDOW_DAYS};
pub use service::{StoreError, StoreResult};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
