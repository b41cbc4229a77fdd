//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::{Duration, Instant};

// == Cache Entry ==
/// A single cache entry: encoded value plus expiry and recency metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Encoded value bytes
    pub data: Vec<u8>,
    /// Absolute expiry instant, None = no expiration
    pub expires_at: Option<Instant>,
    /// Handle of this key's node in the LRU list
    pub node: usize,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates an entry expiring `ttl` after `now`, or never if `ttl` is None.
    pub fn new(data: Vec<u8>, now: Instant, ttl: Option<Duration>, node: usize) -> Self {
        Self {
            data,
            expires_at: ttl.map(|ttl| now + ttl),
            node,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now`.
    ///
    /// An entry is expired only once `now` is strictly past its expiry
    /// instant; at the exact boundary it is still live.
    pub fn is_expired(&self, now: Instant) -> bool {
        match self.expires_at {
            Some(expires) => now > expires,
            None => false,
        }
    }

    // == Time To Live ==
    /// Returns the remaining lifetime at `now`, or None if the entry never expires.
    pub fn ttl_remaining(&self, now: Instant) -> Option<Duration> {
        self.expires_at
            .map(|expires| expires.saturating_duration_since(now))
    }
}
