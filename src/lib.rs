//! Ads Analyzer - resource core
//!
//! In-memory result cache with TTL expiration and LRU eviction, and a keyed
//! token-bucket rate limiter with idle bucket reclamation, served behind a
//! small operational HTTP surface.

pub mod api;
pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod ratelimit;
pub mod tasks;

pub use api::AppState;
pub use cache::{MemoryCache, MemoryCacheOptions};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::Config;
pub use error::{Error, Result};
pub use ratelimit::{Decision, RateLimiter, RateLimiterOptions};
