//! HTTP handlers grouped by resource.
//!
//! # Invariants
//! - Store calls run on the blocking pool; handlers never touch SQLite on
//!   the async runtime.

use crate::error::ApiError;
use love_journal_core::StoreResult;

pub mod anniversaries;
pub mod operation_logs;
pub mod records;

pub(crate) async fn blocking<T, F>(call: F) -> Result<T, ApiError>
where
    F: FnOnce() -> StoreResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(call)
        .await
        .map_err(ApiError::Task)?
        .map_err(ApiError::from)
}
