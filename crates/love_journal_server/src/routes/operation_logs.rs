use super::blocking;
use crate::error::ApiError;
use crate::AppState;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use love_journal_core::{OperationLogEntry, OperationLogQuery, OperationLogStats};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub limit: Option<u32>,
    #[serde(default)]
    pub offset: u32,
    pub table_name: Option<String>,
}

impl From<ListParams> for OperationLogQuery {
    fn from(value: ListParams) -> Self {
        Self {
            limit: value.limit,
            offset: value.offset,
            table_name: value.table_name,
        }
    }
}

pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<OperationLogEntry>>, ApiError> {
    let Query(params) = query?;
    let service = state.journal.operation_logs.clone();
    let query = OperationLogQuery::from(params);
    blocking(move || service.list(&query)).await.map(Json)
}

pub async fn stats(State(state): State<AppState>) -> Result<Json<OperationLogStats>, ApiError> {
    let service = state.journal.operation_logs.clone();
    blocking(move || service.stats()).await.map(Json)
}
