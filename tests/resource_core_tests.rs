//! Integration Tests for the cache and the rate limiter
//!
//! Drives both components through their public API with a manual clock.

use std::sync::Arc;
use std::time::Duration;

use ads_analyzer::{
    Error, ManualClock, MemoryCache, MemoryCacheOptions, RateLimiter, RateLimiterOptions,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct AnalysisResult {
    domain: String,
    total_advertisers: usize,
    advertisers: Vec<(String, usize)>,
}

fn sample(domain: &str) -> AnalysisResult {
    AnalysisResult {
        domain: domain.to_string(),
        total_advertisers: 2,
        advertisers: vec![("google.com".to_string(), 12), ("appnexus.com".to_string(), 3)],
    }
}

fn cache(ttl: Duration, max_items: usize) -> (MemoryCache, ManualClock) {
    let clock = ManualClock::new();
    let cache = MemoryCache::new(MemoryCacheOptions {
        ttl,
        max_items,
        auto_janitor: false,
        clock: Arc::new(clock.clone()),
        ..MemoryCacheOptions::default()
    });
    (cache, clock)
}

fn limiter(rate: f64, burst: f64, idle_ttl: Duration) -> (RateLimiter, ManualClock) {
    let clock = ManualClock::new();
    let limiter = RateLimiter::with_options(RateLimiterOptions {
        rate_per_sec: rate,
        burst,
        idle_ttl,
        auto_janitor: false,
        clock: Arc::new(clock.clone()),
    });
    (limiter, clock)
}

// == Cache ==

#[test]
fn test_cache_roundtrip_before_ttl() {
    let (cache, clock) = cache(Duration::from_secs(600), 0);

    cache.set("msn.com", &sample("msn.com"), Some(Duration::from_secs(1))).unwrap();
    clock.advance(Duration::from_millis(999));

    assert_eq!(
        cache.get::<AnalysisResult>("msn.com").unwrap(),
        Some(sample("msn.com"))
    );
}

#[test]
fn test_cache_ttl_expiry() {
    let (cache, clock) = cache(Duration::from_millis(100), 0);

    cache.set("cnn.com", &sample("cnn.com"), None).unwrap();
    clock.advance(Duration::from_millis(101));

    assert_eq!(cache.get::<AnalysisResult>("cnn.com").unwrap(), None);
}

#[test]
fn test_cache_capacity_and_promotion() {
    let (cache, _) = cache(Duration::ZERO, 2);

    cache.set("X", &sample("x"), None).unwrap();
    cache.set("Y", &sample("y"), None).unwrap();
    assert!(cache.get::<AnalysisResult>("X").unwrap().is_some());
    cache.set("Z", &sample("z"), None).unwrap();

    assert!(cache.get::<AnalysisResult>("Y").unwrap().is_none());
    assert!(cache.get::<AnalysisResult>("X").unwrap().is_some());
    assert!(cache.get::<AnalysisResult>("Z").unwrap().is_some());
    assert_eq!(cache.stats().evictions, 1);
}

#[test]
fn test_cache_sweep_overrides_recency() {
    let (cache, clock) = cache(Duration::from_millis(100), 0);

    cache.set("a", &1, None).unwrap();
    cache.set("b", &2, None).unwrap();
    clock.advance(Duration::from_millis(95));
    cache.get::<i32>("a").unwrap();
    cache.get::<i32>("b").unwrap();
    clock.advance(Duration::from_millis(10));

    assert_eq!(cache.sweep_expired(), 2);
    assert!(cache.is_empty());
}

#[test]
fn test_cache_type_mismatch_surfaces_error() {
    let (cache, _) = cache(Duration::ZERO, 0);

    cache.set("k", &sample("k"), None).unwrap();

    assert!(matches!(cache.get::<u64>("k"), Err(Error::Serialization(_))));
}

// == Rate Limiter ==

#[test]
fn test_limiter_token_bucket_scenario() {
    let (limiter, clock) = limiter(2.0, 2.0, Duration::from_secs(600));

    assert!(limiter.allow("k").allowed);
    assert!(limiter.allow("k").allowed);

    let denied = limiter.allow("k");
    assert!(!denied.allowed);
    assert!(denied.retry_after > Duration::ZERO);
    assert!(limiter.allow("other").allowed, "distinct key is independent");

    clock.advance(Duration::from_millis(500));
    assert!(limiter.allow("k").allowed);
}

#[test]
fn test_limiter_reclamation_respects_burst() {
    let (limiter, clock) = limiter(1.0, 4.0, Duration::from_secs(30));

    for _ in 0..4 {
        assert!(limiter.allow("client").allowed);
    }
    clock.advance(Duration::from_secs(31));
    assert_eq!(limiter.sweep_idle(), 1);
    assert_eq!(limiter.bucket_count(), 0);

    let granted = (0..20).filter(|_| limiter.allow("client").allowed).count();
    assert_eq!(granted, 4);
}

#[test]
fn test_limiter_retry_hint_seconds() {
    let (limiter, _) = limiter(1.0, 1.0, Duration::from_secs(600));

    assert_eq!(limiter.allow("k").retry_after_secs(), 0);
    let denied = limiter.allow("k");
    assert_eq!(denied.retry_after, Duration::from_secs(1));
    assert_eq!(denied.retry_after_secs(), 1);
}
