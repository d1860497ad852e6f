//! Transport error mapping.
//!
//! # Invariants
//! - `NotFound` maps to 404, `BadRequest` to 400, everything else to 500.
//! - Every error body is `{"detail": "<message>"}`.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use love_journal_core::StoreError;
use log::error;
use serde_json::json;
use std::fmt::{Display, Formatter};

/// Failure of one HTTP request.
#[derive(Debug)]
pub enum ApiError {
    Store(StoreError),
    /// Body, path or query string could not be decoded.
    InvalidInput(String),
    /// The blocking task running the store call did not complete.
    Task(tokio::task::JoinError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Store(StoreError::NotFound { .. }) => StatusCode::NOT_FOUND,
            Self::Store(StoreError::BadRequest(_)) | Self::InvalidInput(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Store(_) | Self::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::InvalidInput(message) => write!(f, "{message}"),
            Self::Task(err) => write!(f, "request task failed: {err}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<StoreError> for ApiError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(value: JsonRejection) -> Self {
        Self::InvalidInput(value.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(value: PathRejection) -> Self {
        Self::InvalidInput(value.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(value: QueryRejection) -> Self {
        Self::InvalidInput(value.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(
                "event=http_request module=server status=error http_status={} error={}",
                status.as_u16(),
                self
            );
        }
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::ApiError;
    use axum::http::StatusCode;
    use love_journal_core::StoreError;

    #[test]
    fn store_errors_map_to_status_codes() {
        let not_found = ApiError::from(StoreError::NotFound {
            entity: "love record",
            id: 7,
        });
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);
        assert_eq!(not_found.to_string(), "love record not found: 7");

        let bad_request = ApiError::from(StoreError::BadRequest("nope".to_string()));
        assert_eq!(bad_request.status(), StatusCode::BAD_REQUEST);

        let invalid = ApiError::InvalidInput("bad json".to_string());
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
    }
}
