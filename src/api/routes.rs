//! API Routes
//!
//! Configures the Axum router with all endpoints and the rate limit layer.

use axum::{extract::Request, middleware, routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::info_span;

use super::handlers::{health_handler, ready_handler, stats_handler, version_handler, AppState};
use super::middleware::rate_limit;

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /health` - Liveness check
/// - `GET /ready` - Cache round-trip readiness probe
/// - `GET /version` - Build name and version
/// - `GET /stats` - Cache and rate limiter statistics
///
/// # Middleware
/// - Request ID: Keeps an incoming `X-Request-ID` or assigns a UUID, and echoes it on the response
/// - Tracing: Logs all requests with their request ID, including throttled ones
/// - CORS: Allows any origin
/// - Rate limiting: Per-client token bucket, 429 with `Retry-After` when exhausted
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler))
        .route("/version", get(version_handler))
        .route("/stats", get(stats_handler))
        .layer(middleware::from_fn_with_state(state.clone(), rate_limit))
        .layer(cors)
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
            let request_id = request
                .headers()
                .get("x-request-id")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("-");
            info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                request_id
            )
        }))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .with_state(state)
}
