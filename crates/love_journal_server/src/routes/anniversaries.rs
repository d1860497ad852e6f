use super::blocking;
use crate::client::RequestClient;
use crate::error::ApiError;
use crate::AppState;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;
use love_journal_core::{
    Anniversary, AnniversaryId, AnniversaryPatch, NewAnniversary, UpcomingAnniversary,
    DEFAULT_WINDOW_DAYS,
};
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpcomingParams {
    #[serde(default = "default_window")]
    pub days: i64,
}

fn default_window() -> i64 {
    DEFAULT_WINDOW_DAYS
}

pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<Anniversary>>, ApiError> {
    let Query(params) = query?;
    let store = state.journal.anniversaries.clone();
    blocking(move || store.list(params.category.as_deref()))
        .await
        .map(Json)
}

pub async fn create(
    State(state): State<AppState>,
    RequestClient(client): RequestClient,
    body: Result<Json<NewAnniversary>, JsonRejection>,
) -> Result<Json<Anniversary>, ApiError> {
    let Json(input) = body?;
    let store = state.journal.anniversaries.clone();
    blocking(move || store.create(&input, Some(&client)))
        .await
        .map(Json)
}

pub async fn upcoming(
    State(state): State<AppState>,
    query: Result<Query<UpcomingParams>, QueryRejection>,
) -> Result<Json<Vec<UpcomingAnniversary>>, ApiError> {
    let Query(params) = query?;
    let store = state.journal.anniversaries.clone();
    blocking(move || store.upcoming(params.days))
        .await
        .map(Json)
}

pub async fn get(
    State(state): State<AppState>,
    path: Result<Path<AnniversaryId>, PathRejection>,
) -> Result<Json<Anniversary>, ApiError> {
    let Path(id) = path?;
    let store = state.journal.anniversaries.clone();
    blocking(move || store.get(id)).await.map(Json)
}

pub async fn update(
    State(state): State<AppState>,
    path: Result<Path<AnniversaryId>, PathRejection>,
    RequestClient(client): RequestClient,
    body: Result<Json<AnniversaryPatch>, JsonRejection>,
) -> Result<Json<Anniversary>, ApiError> {
    let Path(id) = path?;
    let Json(patch) = body?;
    let store = state.journal.anniversaries.clone();
    blocking(move || store.update(id, &patch, Some(&client)))
        .await
        .map(Json)
}

pub async fn delete(
    State(state): State<AppState>,
    path: Result<Path<AnniversaryId>, PathRejection>,
    RequestClient(client): RequestClient,
) -> Result<Json<Value>, ApiError> {
    let Path(id) = path?;
    let store = state.journal.anniversaries.clone();
    blocking(move || store.delete(id, Some(&client))).await?;
    Ok(Json(json!({ "message": "anniversary deleted" })))
}
