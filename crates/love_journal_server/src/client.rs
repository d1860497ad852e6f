//! Request metadata for the audit log.

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::header::USER_AGENT;
use axum::http::request::Parts;
use love_journal_core::ClientContext;
use std::convert::Infallible;
use std::net::SocketAddr;

/// Peer address and user agent of the current request.
///
/// The IP is absent when the router runs without connect info (tests).
/// A missing `User-Agent` header is recorded as an empty string.
#[derive(Debug, Clone)]
pub struct RequestClient(pub ClientContext);

impl<S> FromRequestParts<S> for RequestClient
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let ip_address = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string());
        let user_agent = parts
            .headers
            .get(USER_AGENT)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();

        Ok(Self(ClientContext {
            ip_address,
            user_agent: Some(user_agent),
        }))
    }
}
