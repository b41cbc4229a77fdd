//! API Module
//!
//! HTTP surface over the cache and the rate limiter.
//!
//! # Endpoints
//! - `GET /health` - Liveness check
//! - `GET /ready` - Cache round-trip readiness probe
//! - `GET /version` - Build name and version
//! - `GET /stats` - Cache and rate limiter statistics

pub mod handlers;
pub mod middleware;
pub mod routes;

pub use handlers::*;
pub use middleware::{client_key, rate_limit};
pub use routes::create_router;
