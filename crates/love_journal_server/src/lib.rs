//! HTTP transport for the love journal core.
//!
//! # Responsibility
//! - Map JSON routes onto the core stores.
//! - Attach peer address and user agent to audited mutations.

use axum::routing::get;
use axum::{Json, Router};
use love_journal_core::Journal;
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;

pub mod client;
pub mod error;
pub mod routes;

pub use error::ApiError;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub journal: Journal,
}

impl AppState {
    pub fn new(journal: Journal) -> Self {
        Self { journal }
    }
}

/// Builds the full route table with permissive CORS.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/api/records",
            get(routes::records::list).post(routes::records::create),
        )
        .route("/api/records/export", get(routes::records::export))
        .route(
            "/api/records/{id}",
            get(routes::records::get)
                .put(routes::records::update)
                .delete(routes::records::delete),
        )
        .route("/api/stats", get(routes::records::stats))
        .route(
            "/api/anniversaries",
            get(routes::anniversaries::list).post(routes::anniversaries::create),
        )
        .route(
            "/api/anniversaries/upcoming",
            get(routes::anniversaries::upcoming),
        )
        .route(
            "/api/anniversaries/{id}",
            get(routes::anniversaries::get)
                .put(routes::anniversaries::update)
                .delete(routes::anniversaries::delete),
        )
        .route("/api/operation-logs", get(routes::operation_logs::list))
        .route(
            "/api/operation-logs/stats",
            get(routes::operation_logs::stats),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "ping": love_journal_core::ping(),
        "version": love_journal_core::core_version(),
    }))
}
