//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Janitor: TTL sweep for the cache, idle bucket reclamation for the rate limiter

mod janitor;

pub use janitor::{spawn_janitor, sweep_interval};
