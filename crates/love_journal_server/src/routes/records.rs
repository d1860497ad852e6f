use super::blocking;
use crate::client::RequestClient;
use crate::error::ApiError;
use crate::AppState;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;
use love_journal_core::{
    LoveRecord, LoveRecordPatch, NewLoveRecord, RecordExport, RecordFilter, RecordId, RecordStats,
};
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Default, Deserialize)]
pub struct ExportParams {
    pub category: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<RecordFilter>, QueryRejection>,
) -> Result<Json<Vec<LoveRecord>>, ApiError> {
    let Query(filter) = query?;
    let store = state.journal.records.clone();
    blocking(move || store.list(&filter)).await.map(Json)
}

pub async fn create(
    State(state): State<AppState>,
    RequestClient(client): RequestClient,
    body: Result<Json<NewLoveRecord>, JsonRejection>,
) -> Result<Json<LoveRecord>, ApiError> {
    let Json(input) = body?;
    let store = state.journal.records.clone();
    blocking(move || store.create(&input, Some(&client)))
        .await
        .map(Json)
}

pub async fn get(
    State(state): State<AppState>,
    path: Result<Path<RecordId>, PathRejection>,
) -> Result<Json<LoveRecord>, ApiError> {
    let Path(id) = path?;
    let store = state.journal.records.clone();
    blocking(move || store.get(id)).await.map(Json)
}

pub async fn update(
    State(state): State<AppState>,
    path: Result<Path<RecordId>, PathRejection>,
    RequestClient(client): RequestClient,
    body: Result<Json<LoveRecordPatch>, JsonRejection>,
) -> Result<Json<LoveRecord>, ApiError> {
    let Path(id) = path?;
    let Json(patch) = body?;
    let store = state.journal.records.clone();
    blocking(move || store.update(id, &patch, Some(&client)))
        .await
        .map(Json)
}

pub async fn delete(
    State(state): State<AppState>,
    path: Result<Path<RecordId>, PathRejection>,
    RequestClient(client): RequestClient,
) -> Result<Json<Value>, ApiError> {
    let Path(id) = path?;
    let store = state.journal.records.clone();
    blocking(move || store.delete(id, Some(&client))).await?;
    Ok(Json(json!({ "message": "love record deleted" })))
}

pub async fn export(
    State(state): State<AppState>,
    query: Result<Query<ExportParams>, QueryRejection>,
) -> Result<Json<RecordExport>, ApiError> {
    let Query(params) = query?;
    let store = state.journal.records.clone();
    blocking(move || store.export(params.category.as_deref()))
        .await
        .map(Json)
}

pub async fn stats(State(state): State<AppState>) -> Result<Json<RecordStats>, ApiError> {
    let store = state.journal.records.clone();
    blocking(move || store.stats()).await.map(Json)
}
