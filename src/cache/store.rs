//! Cache Store Module
//!
//! Cache engine combining HashMap storage with LRU ordering and TTL expiration.
//! The store is single-threaded and takes `now` explicitly; [`MemoryCache`]
//! owns the locking and the clock.
//!
//! [`MemoryCache`]: crate::cache::MemoryCache

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::cache::{CacheEntry, CacheStats, LruList};

// == Cache Store ==
/// Byte-level cache storage with LRU eviction and TTL support.
///
/// The map and the LRU list always hold the same key set: every method that
/// touches one updates the other before returning.
#[derive(Debug)]
pub struct CacheStore {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// Recency ordering, one node per entry
    lru: LruList,
    /// Performance statistics
    stats: CacheStats,
    /// Maximum number of entries, 0 = unbounded
    max_entries: usize,
    /// TTL applied when a write does not carry its own, None = never expire
    default_ttl: Option<Duration>,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a new CacheStore.
    ///
    /// # Arguments
    /// * `max_entries` - Capacity bound, 0 disables LRU eviction
    /// * `default_ttl` - TTL for writes without their own, zero = never expire
    pub fn new(max_entries: usize, default_ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruList::new(),
            stats: CacheStats::new(),
            max_entries,
            default_ttl: (!default_ttl.is_zero()).then_some(default_ttl),
        }
    }

    /// Resolves the lifetime of a write: its own TTL if non-zero, else the default.
    pub fn effective_ttl(&self, ttl: Option<Duration>) -> Option<Duration> {
        match ttl {
            Some(ttl) if !ttl.is_zero() => Some(ttl),
            _ => self.default_ttl,
        }
    }

    // == Set ==
    /// Stores encoded bytes under `key`.
    ///
    /// Overwriting replaces the value, resets the expiry and promotes the key.
    /// A fresh insert that pushes the store over capacity evicts from the LRU
    /// tail until the bound holds again.
    ///
    /// Returns the number of entries evicted.
    pub fn set(&mut self, key: String, data: Vec<u8>, ttl: Option<Duration>, now: Instant) -> usize {
        let ttl = self.effective_ttl(ttl);

        if let Some(entry) = self.entries.get_mut(&key) {
            entry.data = data;
            entry.expires_at = ttl.map(|ttl| now + ttl);
            self.lru.move_to_front(entry.node);
            return 0;
        }

        let node = self.lru.push_front(key.clone());
        self.entries.insert(key, CacheEntry::new(data, now, ttl, node));

        let evicted = self.evict_overflow();
        self.stats.set_total_entries(self.entries.len());
        evicted
    }

    // == Get ==
    /// Returns the bytes stored under `key` if present and live at `now`.
    ///
    /// The expiry check and the recency promotion happen in the same call, so
    /// a hit is always promoted and an expired entry is never promoted.
    /// Expired entries are removed on the spot and count as a miss.
    pub fn get(&mut self, key: &str, now: Instant) -> Option<&[u8]> {
        let expired = match self.entries.get(key) {
            Some(entry) => entry.is_expired(now),
            None => {
                self.stats.record_miss();
                return None;
            }
        };

        if expired {
            self.remove_entry(key);
            self.stats.record_expirations(1);
            self.stats.record_miss();
            return None;
        }

        self.stats.record_hit();
        let entry = self.entries.get(key)?;
        self.lru.move_to_front(entry.node);
        Some(&entry.data)
    }

    // == Contains ==
    /// Reports whether `key` is live at `now` without touching recency or stats.
    pub fn contains(&self, key: &str, now: Instant) -> bool {
        self.entries
            .get(key)
            .is_some_and(|entry| !entry.is_expired(now))
    }

    // == Delete ==
    /// Removes an entry by key. Returns whether anything was removed.
    pub fn delete(&mut self, key: &str) -> bool {
        self.remove_entry(key).is_some()
    }

    // == Expired Keys ==
    /// Lists every key whose entry is past expiry at `now`.
    pub fn expired_keys(&self, now: Instant) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Removes `key` only if it is still expired at `now`.
    pub fn remove_if_expired(&mut self, key: &str, now: Instant) -> bool {
        let expired = self
            .entries
            .get(key)
            .is_some_and(|entry| entry.is_expired(now));
        if expired {
            self.remove_entry(key);
            self.stats.record_expirations(1);
        }
        expired
    }

    // == Cleanup Expired ==
    /// Removes all expired entries regardless of recency.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&mut self, now: Instant) -> usize {
        self.expired_keys(now)
            .iter()
            .filter(|key| self.remove_if_expired(key, now))
            .count()
    }

    /// Counts the last successful `get` as a miss instead, for values the
    /// caller could not decode.
    pub fn record_decode_failure(&mut self) {
        self.stats.record_decode_failure();
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Keys from most to least recently used.
    pub fn keys_by_recency(&self) -> Vec<String> {
        self.lru.iter().map(str::to_owned).collect()
    }

    fn remove_entry(&mut self, key: &str) -> Option<CacheEntry> {
        let entry = self.entries.remove(key)?;
        self.lru.remove(entry.node);
        self.stats.set_total_entries(self.entries.len());
        Some(entry)
    }

    fn evict_overflow(&mut self) -> usize {
        let mut evicted = 0;
        while self.max_entries > 0 && self.entries.len() > self.max_entries {
            let Some(key) = self.lru.pop_back() else {
                break;
            };
            self.entries.remove(&key);
            self.stats.record_eviction();
            evicted += 1;
        }
        evicted
    }

    /// Asserts that the map and the LRU list describe the same key set.
    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        assert_eq!(self.entries.len(), self.lru.len(), "map and LRU list sizes differ");
        for (key, entry) in &self.entries {
            assert_eq!(
                self.lru.key(entry.node),
                Some(key.as_str()),
                "entry '{}' points at a foreign LRU node",
                key
            );
        }
        if self.max_entries > 0 {
            assert!(self.entries.len() <= self.max_entries, "capacity exceeded");
        }
    }
}
