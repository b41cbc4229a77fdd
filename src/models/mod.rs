//! Response models for the HTTP surface
//!
//! DTOs serialized into HTTP response bodies.

pub mod responses;

// Re-export commonly used types
pub use responses::{
    ErrorResponse, HealthResponse, LimiterStats, RateLimitedResponse, ReadyResponse,
    StatsResponse, VersionResponse,
};
