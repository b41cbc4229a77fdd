//! API Handlers
//!
//! HTTP request handlers for the operational endpoints.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::cache::MemoryCache;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::models::{HealthResponse, LimiterStats, ReadyResponse, StatsResponse, VersionResponse};
use crate::ratelimit::RateLimiter;

/// Application state shared across all handlers.
///
/// Both components are cheap clone handles over shared storage.
#[derive(Clone, Debug)]
pub struct AppState {
    pub cache: MemoryCache,
    pub limiter: RateLimiter,
}

impl AppState {
    pub fn new(cache: MemoryCache, limiter: RateLimiter) -> Self {
        Self { cache, limiter }
    }

    /// Builds the cache and the rate limiter from configuration.
    ///
    /// Must run inside a tokio runtime for the janitors to start.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            MemoryCache::new(config.cache_options()),
            RateLimiter::with_options(config.limiter_options()),
        )
    }

    /// Stops both background janitors.
    pub fn close(&self) {
        self.cache.close();
        self.limiter.close();
    }
}

/// Distinguishes readiness checks started within the same millisecond.
static READY_SEQ: AtomicU64 = AtomicU64::new(0);

fn ready_key() -> String {
    let seq = READY_SEQ.fetch_add(1, Ordering::Relaxed);
    format!("ready:{}:{}", chrono::Utc::now().format("%Y%m%d%H%M%S%.3f"), seq)
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Probe {
    ok: String,
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

/// Handler for GET /ready
///
/// Writes a short-lived probe value, reads it back and deletes it.
pub async fn ready_handler(State(state): State<AppState>) -> Result<Json<ReadyResponse>> {
    let key = ready_key();
    let probe = Probe {
        ok: "1".to_string(),
    };

    let result = state
        .cache
        .set(&key, &probe, Some(Duration::from_secs(1)))
        .and_then(|()| state.cache.get::<Probe>(&key));
    state.cache.delete(&key);

    match result {
        Ok(Some(out)) if out == probe => Ok(Json(ReadyResponse::ready())),
        Ok(_) => Err(Error::NotReady("cache round-trip returned a miss".to_string())),
        Err(err) => Err(Error::NotReady(err.to_string())),
    }
}

/// Handler for GET /version
pub async fn version_handler() -> Json<VersionResponse> {
    Json(VersionResponse::current())
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let limiter = LimiterStats {
        buckets: state.limiter.bucket_count(),
        rate_per_sec: state.limiter.rate(),
        burst: state.limiter.burst(),
        throttled: state.limiter.throttled(),
    };

    Json(StatsResponse::new(state.cache.stats(), limiter))
}
