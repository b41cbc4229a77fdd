//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::MemoryCacheOptions;
use crate::ratelimit::RateLimiterOptions;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible
/// defaults. Durations are whole seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Default TTL for cached results, 0 = never expire
    pub cache_ttl: u64,
    /// Maximum cached entries, 0 = unbounded
    pub cache_max_items: usize,
    /// Lower bound for the cache sweep interval
    pub cache_sweep_min: u64,
    /// Upper bound for the cache sweep interval
    pub cache_sweep_max: u64,
    /// Requests per second allowed per client
    pub rate_per_sec: u32,
    /// Burst size per client
    pub rate_burst: u32,
    /// Idle time after which a client's bucket is dropped
    pub rate_bucket_ttl: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 8080)
    /// - `CACHE_TTL` - Default cache TTL in seconds (default: 600)
    /// - `CACHE_MAX_ITEMS` - Cache capacity, 0 = unbounded (default: 0)
    /// - `CACHE_SWEEP_MIN` - Minimum sweep interval in seconds (default: 1)
    /// - `CACHE_SWEEP_MAX` - Maximum sweep interval in seconds (default: 300)
    /// - `RATE_PER_SEC` - Requests per second per client (default: 10)
    /// - `RATE_BURST` - Burst size per client (default: 20)
    /// - `RATE_BUCKET_TTL` - Idle bucket lifetime in seconds (default: 600)
    ///
    /// Unparseable values fall back to their defaults; out-of-range values are
    /// coerced (see [`Config::normalized`]).
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: env_or("SERVER_PORT", defaults.server_port),
            cache_ttl: env_or("CACHE_TTL", defaults.cache_ttl),
            cache_max_items: env_or("CACHE_MAX_ITEMS", defaults.cache_max_items),
            cache_sweep_min: env_or("CACHE_SWEEP_MIN", defaults.cache_sweep_min),
            cache_sweep_max: env_or("CACHE_SWEEP_MAX", defaults.cache_sweep_max),
            rate_per_sec: env_or("RATE_PER_SEC", defaults.rate_per_sec),
            rate_burst: env_or("RATE_BURST", defaults.rate_burst),
            rate_bucket_ttl: env_or("RATE_BUCKET_TTL", defaults.rate_bucket_ttl),
        }
        .normalized()
    }

    /// Applies the same coercions the components would apply themselves, so
    /// the values logged at startup are the ones in effect.
    pub fn normalized(mut self) -> Self {
        if self.rate_per_sec == 0 {
            self.rate_per_sec = 1;
        }
        if self.rate_burst < self.rate_per_sec {
            self.rate_burst = self.rate_per_sec;
        }
        if self.cache_sweep_min == 0 {
            self.cache_sweep_min = 1;
        }
        if self.cache_sweep_max < self.cache_sweep_min {
            self.cache_sweep_max = self.cache_sweep_min;
        }
        if self.rate_bucket_ttl == 0 {
            self.rate_bucket_ttl = Self::default().rate_bucket_ttl;
        }
        self
    }

    /// Cache options derived from this configuration.
    pub fn cache_options(&self) -> MemoryCacheOptions {
        MemoryCacheOptions {
            ttl: Duration::from_secs(self.cache_ttl),
            max_items: self.cache_max_items,
            sweep_min: Duration::from_secs(self.cache_sweep_min),
            sweep_max: Duration::from_secs(self.cache_sweep_max),
            ..MemoryCacheOptions::default()
        }
    }

    /// Rate limiter options derived from this configuration.
    pub fn limiter_options(&self) -> RateLimiterOptions {
        RateLimiterOptions {
            rate_per_sec: f64::from(self.rate_per_sec),
            burst: f64::from(self.rate_burst),
            idle_ttl: Duration::from_secs(self.rate_bucket_ttl),
            ..RateLimiterOptions::default()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 8080,
            cache_ttl: 600,
            cache_max_items: 0,
            cache_sweep_min: 1,
            cache_sweep_max: 300,
            rate_per_sec: 10,
            rate_burst: 20,
            rate_bucket_ttl: 600,
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    const VARS: [&str; 8] = [
        "SERVER_PORT",
        "CACHE_TTL",
        "CACHE_MAX_ITEMS",
        "CACHE_SWEEP_MIN",
        "CACHE_SWEEP_MAX",
        "RATE_PER_SEC",
        "RATE_BURST",
        "RATE_BUCKET_TTL",
    ];

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.cache_ttl, 600);
        assert_eq!(config.cache_max_items, 0);
        assert_eq!(config.rate_per_sec, 10);
        assert_eq!(config.rate_burst, 20);
        assert_eq!(config.normalized(), Config::default());
    }

    // Everything touching the process environment lives in one test so
    // parallel tests never observe each other's variables.
    #[test]
    fn test_config_from_env() {
        for var in VARS {
            env::remove_var(var);
        }
        assert_eq!(Config::from_env(), Config::default());

        env::set_var("CACHE_TTL", "30");
        env::set_var("CACHE_MAX_ITEMS", "500");
        env::set_var("RATE_PER_SEC", "5");
        env::set_var("RATE_BURST", "2");
        env::set_var("SERVER_PORT", "not-a-port");

        let config = Config::from_env();
        assert_eq!(config.cache_ttl, 30);
        assert_eq!(config.cache_max_items, 500);
        assert_eq!(config.rate_per_sec, 5);
        assert_eq!(config.rate_burst, 5, "burst below rate is raised to rate");
        assert_eq!(config.server_port, 8080, "invalid values fall back to defaults");

        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_normalized_coerces_sweep_bounds() {
        let config = Config {
            cache_sweep_min: 0,
            cache_sweep_max: 0,
            rate_per_sec: 0,
            rate_burst: 0,
            rate_bucket_ttl: 0,
            ..Config::default()
        }
        .normalized();

        assert_eq!(config.cache_sweep_min, 1);
        assert_eq!(config.cache_sweep_max, 1);
        assert_eq!(config.rate_per_sec, 1);
        assert_eq!(config.rate_burst, 1);
        assert_eq!(config.rate_bucket_ttl, 600);
    }

    #[test]
    fn test_component_options() {
        let config = Config::default();

        let cache = config.cache_options();
        assert_eq!(cache.ttl, Duration::from_secs(600));
        assert_eq!(cache.sweep_max, Duration::from_secs(300));
        assert!(cache.auto_janitor);

        let limiter = config.limiter_options();
        assert_eq!(limiter.rate_per_sec, 10.0);
        assert_eq!(limiter.burst, 20.0);
        assert_eq!(limiter.idle_ttl, Duration::from_secs(600));
    }
}
