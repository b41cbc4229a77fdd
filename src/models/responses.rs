//! Response DTOs for the HTTP surface
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::CacheStats;

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status, always "ok"
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Response body for a successful readiness probe (GET /ready)
#[derive(Debug, Clone, Serialize)]
pub struct ReadyResponse {
    pub status: String,
    pub timestamp: String,
}

impl ReadyResponse {
    pub fn ready() -> Self {
        Self {
            status: "ready".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Response body for GET /version
#[derive(Debug, Clone, Serialize)]
pub struct VersionResponse {
    pub name: &'static str,
    pub version: &'static str,
}

impl VersionResponse {
    pub fn current() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}

/// Rate limiter section of the stats response
#[derive(Debug, Clone, Serialize)]
pub struct LimiterStats {
    /// Live per-client buckets
    pub buckets: usize,
    pub rate_per_sec: f64,
    pub burst: f64,
    /// Requests denied since startup
    pub throttled: u64,
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub cache: CacheStats,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
    pub rate_limiter: LimiterStats,
}

impl StatsResponse {
    pub fn new(cache: CacheStats, rate_limiter: LimiterStats) -> Self {
        Self {
            hit_rate: cache.hit_rate(),
            cache,
            rate_limiter,
        }
    }
}

/// Body of a 429 response
#[derive(Debug, Clone, Serialize)]
pub struct RateLimitedResponse {
    pub error: String,
    /// Exact wait before one request is admitted, in milliseconds
    pub retry_after_ms: u64,
}

impl RateLimitedResponse {
    pub fn new(retry_after_ms: u64) -> Self {
        Self {
            error: "rate limit exceeded".to_string(),
            retry_after_ms,
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
