//! Rate Limiter Module
//!
//! Keyed token-bucket limiter. Buckets are created on first use and reclaimed
//! by a janitor once they have been idle longer than the configured TTL.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::sync::watch;

use crate::clock::{self, Clock};
use crate::ratelimit::{Bucket, Decision};
use crate::tasks::spawn_janitor;

/// Bucket used for requests that carry no identifying key.
pub const ANONYMOUS_KEY: &str = "_anon";

// == Options ==
/// Construction parameters for [`RateLimiter`].
#[derive(Clone)]
pub struct RateLimiterOptions {
    /// Refill rate in tokens per second
    pub rate_per_sec: f64,
    /// Bucket capacity
    pub burst: f64,
    /// Inactivity after which a bucket is reclaimed
    pub idle_ttl: Duration,
    /// Start the idle-bucket janitor at construction
    pub auto_janitor: bool,
    /// Time source
    pub clock: Arc<dyn Clock>,
}

impl RateLimiterOptions {
    /// Coerces unusable values: a non-positive rate becomes 1/s, a burst below
    /// the rate is raised to the rate, and a zero idle TTL takes the default.
    fn normalized(mut self) -> Self {
        if !(self.rate_per_sec > 0.0) {
            self.rate_per_sec = 1.0;
        }
        if !(self.burst >= self.rate_per_sec) {
            self.burst = self.rate_per_sec;
        }
        if self.idle_ttl.is_zero() {
            self.idle_ttl = Self::default().idle_ttl;
        }
        self
    }
}

impl Default for RateLimiterOptions {
    fn default() -> Self {
        Self {
            rate_per_sec: 10.0,
            burst: 20.0,
            idle_ttl: Duration::from_secs(600),
            auto_janitor: true,
            clock: clock::system(),
        }
    }
}

impl fmt::Debug for RateLimiterOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RateLimiterOptions")
            .field("rate_per_sec", &self.rate_per_sec)
            .field("burst", &self.burst)
            .field("idle_ttl", &self.idle_ttl)
            .field("auto_janitor", &self.auto_janitor)
            .finish_non_exhaustive()
    }
}

struct Inner {
    rate: f64,
    burst: f64,
    idle_ttl: Duration,
    buckets: DashMap<String, Arc<Mutex<Bucket>>>,
    throttled: AtomicU64,
    clock: Arc<dyn Clock>,
    shutdown: watch::Sender<bool>,
}

impl Inner {
    /// Returns the bucket for `key`, creating a full one if absent.
    ///
    /// The map guard is released before returning so callers never hold a
    /// shard lock while they lock the bucket.
    fn bucket(&self, key: &str) -> Arc<Mutex<Bucket>> {
        let existing = self.buckets.get(key).map(|bucket| Arc::clone(bucket.value()));
        if let Some(bucket) = existing {
            return bucket;
        }

        let now = self.clock.now();
        let entry = self
            .buckets
            .entry(key.to_owned())
            .or_insert_with(|| Arc::new(Mutex::new(Bucket::full(self.burst, now))));
        Arc::clone(entry.value())
    }

    /// Spends a token for `key`, starting from an already fetched bucket.
    ///
    /// A bucket reclaimed between the lookup and the lock is no longer in the
    /// table, so the key is looked up again and the fresh bucket is charged.
    fn allow_from(&self, key: &str, mut bucket: Arc<Mutex<Bucket>>) -> Decision {
        loop {
            {
                let mut guard = bucket.lock();
                if !guard.is_reclaimed() {
                    let now = self.clock.now();
                    let decision = guard.take(self.rate, self.burst, now);
                    if !decision.allowed {
                        self.throttled.fetch_add(1, Ordering::Relaxed);
                    }
                    return decision;
                }
            }
            bucket = self.bucket(key);
        }
    }

    /// Drops buckets idle for longer than the TTL.
    ///
    /// Each bucket's last-seen time is read under its own lock while the shard
    /// holding it is locked, so a bucket is never removed in the middle of an
    /// update. Removed buckets are marked so a caller that fetched one just
    /// before removal moves on to the bucket that replaces it.
    fn sweep_idle(&self) -> usize {
        let now = self.clock.now();
        let mut removed = 0;
        self.buckets.retain(|_, bucket| {
            let mut bucket = bucket.lock();
            if bucket.idle_for(now) <= self.idle_ttl {
                return true;
            }
            bucket.mark_reclaimed();
            removed += 1;
            false
        });
        removed
    }
}

// == Rate Limiter ==
/// Per-key token-bucket rate limiter.
///
/// Cloning is cheap and every clone shares the same buckets.
#[derive(Clone)]
pub struct RateLimiter {
    inner: Arc<Inner>,
}

impl RateLimiter {
    // == Constructors ==
    /// Creates a limiter allowing `rate_per_sec` requests per second per key
    /// with bursts of up to `burst`.
    pub fn new(rate_per_sec: f64, burst: f64) -> Self {
        Self::with_options(RateLimiterOptions {
            rate_per_sec,
            burst,
            ..RateLimiterOptions::default()
        })
    }

    /// Creates a limiter from explicit options.
    ///
    /// The idle janitor ticks at half the idle TTL. Outside a tokio runtime it
    /// is not started and buckets are only reclaimed through [`Self::sweep_idle`].
    pub fn with_options(options: RateLimiterOptions) -> Self {
        let options = options.normalized();
        let (shutdown, shutdown_rx) = watch::channel(false);
        let inner = Arc::new(Inner {
            rate: options.rate_per_sec,
            burst: options.burst,
            idle_ttl: options.idle_ttl,
            buckets: DashMap::new(),
            throttled: AtomicU64::new(0),
            clock: options.clock,
            shutdown,
        });

        if options.auto_janitor {
            spawn_janitor(
                "ratelimit",
                options.idle_ttl / 2,
                Arc::downgrade(&inner),
                shutdown_rx,
                Inner::sweep_idle,
            );
        }

        Self { inner }
    }

    // == Allow ==
    /// Checks whether a request identified by `key` may proceed now.
    ///
    /// An empty key shares the anonymous bucket.
    pub fn allow(&self, key: &str) -> Decision {
        let key = if key.is_empty() { ANONYMOUS_KEY } else { key };
        self.inner.allow_from(key, self.inner.bucket(key))
    }

    /// Runs one idle-reclamation pass immediately and returns how many
    /// buckets it removed.
    pub fn sweep_idle(&self) -> usize {
        self.inner.sweep_idle()
    }

    /// Total denials since construction.
    pub fn throttled(&self) -> u64 {
        self.inner.throttled.load(Ordering::Relaxed)
    }

    /// Number of live buckets.
    pub fn bucket_count(&self) -> usize {
        self.inner.buckets.len()
    }

    pub fn rate(&self) -> f64 {
        self.inner.rate
    }

    pub fn burst(&self) -> f64 {
        self.inner.burst
    }

    pub fn idle_ttl(&self) -> Duration {
        self.inner.idle_ttl
    }

    // == Close ==
    /// Stops the idle janitor. `allow` keeps working.
    pub fn close(&self) {
        self.inner.shutdown.send_replace(true);
    }
}

impl fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RateLimiter")
            .field("rate", &self.inner.rate)
            .field("burst", &self.inner.burst)
            .field("idle_ttl", &self.inner.idle_ttl)
            .field("buckets", &self.inner.buckets.len())
            .field("throttled", &self.throttled())
            .finish_non_exhaustive()
    }
}
