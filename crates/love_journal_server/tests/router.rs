use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use love_journal_core::{DatabaseConfig, Journal, RecurrencePolicy};
use love_journal_server::{build_router, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

fn make_app(dir: &tempfile::TempDir) -> (Router, Journal) {
    let journal = Journal::open(
        DatabaseConfig::new(dir.path().join("journal.db")),
        RecurrencePolicy::default(),
    )
    .unwrap();
    (build_router(AppState::new(journal.clone())), journal)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    let resp = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), 100_000).await.unwrap();
    let parsed = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, parsed)
}

fn record_body(category: &str, date: &str) -> Value {
    json!({
        "category": category,
        "date": date,
        "description": "picnic in the park",
        "mood": "happy",
        "timestamp": 1_700_000_000_000_i64,
    })
}

#[tokio::test]
async fn health_endpoint_returns_ok() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _journal) = make_app(&dir);

    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["ping"], "pong");
}

#[tokio::test]
async fn record_lifecycle_over_http() {
    let dir = tempfile::tempdir().unwrap();
    let (app, journal) = make_app(&dir);

    let (status, created) = send(
        &app,
        Method::POST,
        "/api/records",
        Some(record_body("date", "2024-02-14")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let id = created["id"].as_i64().unwrap();
    assert_eq!(created["date"], "2024-02-14");

    let (status, fetched) = send(&app, Method::GET, &format!("/api/records/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    let (status, updated) = send(
        &app,
        Method::PUT,
        &format!("/api/records/{id}"),
        Some(json!({ "mood": "calm" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["mood"], "calm");
    assert_eq!(updated["category"], "date");

    let (status, listed) = send(&app, Method::GET, "/api/records?category=date", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let (status, deleted) = send(&app, Method::DELETE, &format!("/api/records/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(deleted["message"].is_string());

    journal.audit().flush();
    let (status, logs) = send(&app, Method::GET, "/api/operation-logs", None).await;
    assert_eq!(status, StatusCode::OK);
    let logs = logs.as_array().unwrap();
    assert_eq!(logs.len(), 3);
    assert_eq!(logs[0]["operation_type"], "DELETE");
    assert_eq!(logs[2]["operation_type"], "CREATE");
    assert_eq!(logs[2]["user_agent"], "");
    assert!(logs[2]["ip_address"].is_null());
    assert_eq!(logs[1]["operation_data"]["new_data"]["mood"], "calm");
}

#[tokio::test]
async fn errors_map_to_status_and_detail() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _journal) = make_app(&dir);

    let (status, body) = send(&app, Method::GET, "/api/records/999999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["detail"].as_str().unwrap().contains("not found"));

    let (_, created) = send(
        &app,
        Method::POST,
        "/api/records",
        Some(record_body("gift", "2024-03-01")),
    )
    .await;
    let id = created["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/records/{id}"),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].is_string());

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/records",
        Some(record_body("gift", "not-a-date")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].is_string());

    let (status, _) = send(&app, Method::DELETE, "/api/anniversaries/999999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn non_integer_id_is_bad_request_with_detail() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _journal) = make_app(&dir);

    for (method, uri) in [
        (Method::GET, "/api/records/abc"),
        (Method::DELETE, "/api/records/abc"),
        (Method::GET, "/api/anniversaries/1.5"),
    ] {
        let (status, body) = send(&app, method, uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert!(body["detail"].is_string(), "{uri}");
    }

    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/anniversaries/abc",
        Some(json!({ "title": "renamed" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn user_agent_header_is_recorded() {
    let dir = tempfile::tempdir().unwrap();
    let (app, journal) = make_app(&dir);

    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/anniversaries")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::USER_AGENT, "journal-app/1.0")
        .body(Body::from(
            json!({ "title": "first date", "date": "2020-05-20", "is_recurring": true })
                .to_string(),
        ))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    journal.audit().flush();
    let (status, logs) = send(
        &app,
        Method::GET,
        "/api/operation-logs?table_name=anniversaries&limit=10",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(logs[0]["user_agent"], "journal-app/1.0");
    assert_eq!(logs[0]["table_name"], "anniversaries");
}

#[tokio::test]
async fn stats_export_and_upcoming_routes_respond() {
    let dir = tempfile::tempdir().unwrap();
    let (app, journal) = make_app(&dir);

    send(&app, Method::POST, "/api/records", Some(record_body("gift", "2024-01-01"))).await;
    send(&app, Method::POST, "/api/records", Some(record_body("trip", "2024-02-01"))).await;

    let (status, stats) = send(&app, Method::GET, "/api/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["total_records"], 2);
    assert_eq!(stats["latest_record"]["date"], "2024-02-01");

    let (status, export) = send(&app, Method::GET, "/api/records/export", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(export["total_records"], 2);
    assert_eq!(export["records"][0]["date"], "2024-01-01");
    assert!(export["category_filter"].is_null());

    let (status, upcoming) = send(
        &app,
        Method::GET,
        "/api/anniversaries/upcoming?days=7",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(upcoming.is_array());

    journal.audit().flush();
    let (status, log_stats) = send(&app, Method::GET, "/api/operation-logs/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(log_stats["operation_stats"][0]["operation_type"], "CREATE");
    assert_eq!(log_stats["operation_stats"][0]["count"], 2);
}
