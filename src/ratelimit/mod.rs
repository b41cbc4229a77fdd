//! Rate Limit Module
//!
//! Keyed token-bucket rate limiting with idle bucket reclamation.

mod bucket;
mod limiter;

pub use bucket::{Bucket, Decision};
pub use limiter::{RateLimiter, RateLimiterOptions, ANONYMOUS_KEY};
