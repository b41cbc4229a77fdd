//! Memory Cache Module
//!
//! Thread-safe, typed front of [`CacheStore`]: values are JSON-encoded on the
//! way in and decoded on the way out, and a janitor sweeps expired entries in
//! the background.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::cache::{CacheStats, CacheStore};
use crate::clock::{self, Clock};
use crate::error::Result;
use crate::tasks::{spawn_janitor, sweep_interval};

/// Upper bound on keys removed per lock acquisition during a sweep.
const SWEEP_BATCH: usize = 256;

// == Options ==
/// Construction parameters for [`MemoryCache`].
#[derive(Clone)]
pub struct MemoryCacheOptions {
    /// Default TTL, zero = entries never expire unless a write says otherwise
    pub ttl: Duration,
    /// Capacity bound, 0 = unbounded
    pub max_items: usize,
    /// Lower clamp for the sweep interval
    pub sweep_min: Duration,
    /// Upper clamp for the sweep interval, also used when `ttl` is zero
    pub sweep_max: Duration,
    /// Start the background sweeper at construction
    pub auto_janitor: bool,
    /// Time source
    pub clock: Arc<dyn Clock>,
}

impl MemoryCacheOptions {
    /// Coerces out-of-range sweep bounds instead of rejecting them.
    fn normalized(mut self) -> Self {
        if self.sweep_min.is_zero() {
            self.sweep_min = Duration::from_secs(1);
        }
        if self.sweep_max < self.sweep_min {
            self.sweep_max = self.sweep_min;
        }
        self
    }
}

impl Default for MemoryCacheOptions {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(600),
            max_items: 0,
            sweep_min: Duration::from_secs(1),
            sweep_max: Duration::from_secs(300),
            auto_janitor: true,
            clock: clock::system(),
        }
    }
}

impl fmt::Debug for MemoryCacheOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryCacheOptions")
            .field("ttl", &self.ttl)
            .field("max_items", &self.max_items)
            .field("sweep_min", &self.sweep_min)
            .field("sweep_max", &self.sweep_max)
            .field("auto_janitor", &self.auto_janitor)
            .finish_non_exhaustive()
    }
}

struct Inner {
    store: Mutex<CacheStore>,
    clock: Arc<dyn Clock>,
    shutdown: watch::Sender<bool>,
}

impl Inner {
    /// Removes every expired entry.
    ///
    /// The scan runs under one lock acquisition; removals are then applied in
    /// batches, each re-checking expiry so a key refreshed in between survives.
    fn sweep(&self) -> usize {
        let now = self.clock.now();
        let expired = self.store.lock().expired_keys(now);

        let mut removed = 0;
        for batch in expired.chunks(SWEEP_BATCH) {
            let mut store = self.store.lock();
            removed += batch
                .iter()
                .filter(|key| store.remove_if_expired(key, now))
                .count();
        }
        removed
    }
}

// == Memory Cache ==
/// In-memory cache with per-entry TTL and optional LRU capacity bound.
///
/// Cloning is cheap and every clone shares the same storage.
#[derive(Clone)]
pub struct MemoryCache {
    inner: Arc<Inner>,
}

impl MemoryCache {
    // == Constructor ==
    /// Creates a cache and, if requested, starts its janitor.
    ///
    /// The janitor needs a tokio runtime; without one the cache still works and
    /// expiry is enforced lazily on lookup.
    pub fn new(options: MemoryCacheOptions) -> Self {
        let options = options.normalized();
        let (shutdown, shutdown_rx) = watch::channel(false);
        let inner = Arc::new(Inner {
            store: Mutex::new(CacheStore::new(options.max_items, options.ttl)),
            clock: options.clock,
            shutdown,
        });

        if options.auto_janitor {
            let interval = sweep_interval(options.ttl, options.sweep_min, options.sweep_max);
            spawn_janitor(
                "cache",
                interval,
                Arc::downgrade(&inner),
                shutdown_rx,
                Inner::sweep,
            );
        }

        Self { inner }
    }

    // == Get ==
    /// Looks up `key` and decodes it into `T`.
    ///
    /// Returns `Ok(None)` for absent or expired keys. A stored value that does
    /// not decode as `T` yields a serialization error and counts as a miss;
    /// the entry itself is left alone.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let now = self.inner.clock.now();
        let mut store = self.inner.store.lock();
        let Some(data) = store.get(key, now) else {
            return Ok(None);
        };

        match serde_json::from_slice(data) {
            Ok(value) => Ok(Some(value)),
            Err(err) => {
                store.record_decode_failure();
                drop(store);
                warn!(key, error = %err, "cached value could not be decoded");
                Err(err.into())
            }
        }
    }

    // == Set ==
    /// Encodes `value` and stores it under `key`.
    ///
    /// `ttl` of `None` or zero falls back to the cache's default TTL.
    pub fn set<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> Result<()> {
        let data = serde_json::to_vec(value)?;
        let now = self.inner.clock.now();

        let evicted = self.inner.store.lock().set(key.to_owned(), data, ttl, now);
        if evicted > 0 {
            debug!(key, evicted, "capacity reached, evicted least recently used entries");
        }
        Ok(())
    }

    // == Delete ==
    /// Removes `key`; absent keys are ignored.
    ///
    /// Returns nothing because removal cannot fail. Callers adapting this to
    /// a fallible delete can always report success.
    pub fn delete(&self, key: &str) {
        self.inner.store.lock().delete(key);
    }

    /// Runs one expiry sweep immediately and returns how many entries it removed.
    pub fn sweep_expired(&self) -> usize {
        self.inner.sweep()
    }

    pub fn stats(&self) -> CacheStats {
        self.inner.store.lock().stats()
    }

    pub fn len(&self) -> usize {
        self.inner.store.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.store.lock().is_empty()
    }

    // == Close ==
    /// Stops the janitor. Foreground operations keep working.
    pub fn close(&self) {
        self.inner.shutdown.send_replace(true);
    }

    #[cfg(test)]
    pub(crate) fn with_store<R>(&self, f: impl FnOnce(&CacheStore) -> R) -> R {
        f(&*self.inner.store.lock())
    }
}

impl fmt::Debug for MemoryCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryCache")
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}
