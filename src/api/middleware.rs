//! Rate Limit Middleware
//!
//! Admits or throttles every request through the shared [`RateLimiter`].
//!
//! [`RateLimiter`]: crate::ratelimit::RateLimiter

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use tracing::debug;

use super::handlers::AppState;
use crate::models::RateLimitedResponse;
use crate::ratelimit::Decision;

/// Derives the rate-limit key for a request.
///
/// Precedence: `X-API-Key` (as `k:<key>`), then the first `X-Forwarded-For`
/// hop, then the peer address (both as `ip:<addr>`). With none of these the
/// key is empty and the request shares the anonymous bucket.
pub fn client_key(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let header_value = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    if let Some(api_key) = header_value("x-api-key") {
        return format!("k:{}", api_key);
    }

    let forwarded = header_value("x-forwarded-for")
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());
    if let Some(ip) = forwarded {
        return format!("ip:{}", ip);
    }

    peer.map(|addr| format!("ip:{}", addr.ip()))
        .unwrap_or_default()
}

/// Middleware applying the per-client token bucket.
pub async fn rate_limit(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let key = client_key(request.headers(), peer);

    let decision = state.limiter.allow(&key);
    if !decision.allowed {
        debug!(
            key = %key,
            path = %request.uri().path(),
            retry_after_ms = decision.retry_after.as_millis() as u64,
            "request throttled"
        );
        return throttled(decision);
    }

    next.run(request).await
}

/// Builds the 429 response for a denied decision.
fn throttled(decision: Decision) -> Response {
    let body = RateLimitedResponse::new(decision.retry_after.as_millis() as u64);
    (
        StatusCode::TOO_MANY_REQUESTS,
        [(header::RETRY_AFTER, decision.retry_after_secs().to_string())],
        Json(body),
    )
        .into_response()
}
