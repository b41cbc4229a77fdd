//! Cache Module
//!
//! Provides in-memory caching with TTL expiration and LRU eviction.

mod entry;
mod lru;
mod memory;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use lru::LruList;
pub use memory::{MemoryCache, MemoryCacheOptions};
pub use stats::CacheStats;
pub use store::CacheStore;
