//! Token Bucket Module
//!
//! Per-key token state and the refill/consume step.

use std::time::{Duration, Instant};

// == Decision ==
/// Outcome of a single admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    /// Whether the request may proceed
    pub allowed: bool,
    /// How long until one token is available, zero when allowed
    pub retry_after: Duration,
}

impl Decision {
    pub fn allow() -> Self {
        Self {
            allowed: true,
            retry_after: Duration::ZERO,
        }
    }

    pub fn deny(retry_after: Duration) -> Self {
        Self {
            allowed: false,
            retry_after,
        }
    }

    /// Retry hint in whole seconds, rounded up.
    ///
    /// Denials always report at least one second so clients never retry
    /// immediately.
    pub fn retry_after_secs(&self) -> u64 {
        if self.allowed {
            return 0;
        }
        let secs = self.retry_after.as_secs() + u64::from(self.retry_after.subsec_nanos() > 0);
        secs.max(1)
    }
}

// == Bucket ==
/// Token state for one key.
#[derive(Debug, Clone)]
pub struct Bucket {
    tokens: f64,
    last_refill: Instant,
    last_seen: Instant,
    /// Set once the bucket has been dropped from the limiter's table
    reclaimed: bool,
}

impl Bucket {
    /// Creates a bucket holding `burst` tokens.
    pub fn full(burst: f64, now: Instant) -> Self {
        Self {
            tokens: burst,
            last_refill: now,
            last_seen: now,
            reclaimed: false,
        }
    }

    // == Take ==
    /// Refills for the time elapsed since the last call, then tries to consume
    /// one token.
    ///
    /// `rate` must be positive; the limiter guarantees it.
    pub fn take(&mut self, rate: f64, burst: f64, now: Instant) -> Decision {
        let elapsed = now.saturating_duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * rate).min(burst);
        self.last_refill = now;
        self.last_seen = now;

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            return Decision::allow();
        }

        let wait = ((1.0 - self.tokens) / rate).max(0.0);
        Decision::deny(Duration::try_from_secs_f64(wait).unwrap_or(Duration::MAX))
    }

    /// How long the bucket has gone without a call, as of `now`.
    pub fn idle_for(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_seen)
    }

    pub fn tokens(&self) -> f64 {
        self.tokens
    }

    /// Marks the bucket as removed from its table. Callers still holding it
    /// must look the key up again instead of spending its tokens.
    pub fn mark_reclaimed(&mut self) {
        self.reclaimed = true;
    }

    pub fn is_reclaimed(&self) -> bool {
        self.reclaimed
    }
}
