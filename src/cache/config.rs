//! Cache configuration.
//!
//! Controls the transient TTL and the uncached-query log via `riserva.toml`.

use std::time::Duration;

use serde::Deserialize;

// 12 hours, matching the expiry the host transient store is asked for.
const DEFAULT_TTL_SECONDS: u64 = 12 * 60 * 60;
const DEFAULT_UNCACHED_LOG_LIMIT: usize = 50;

/// Cache configuration from `riserva.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Enable interception. When disabled every query bypasses the cache.
    pub enabled: bool,
    /// Entry lifetime handed to the transient store.
    pub ttl_seconds: u64,
    /// Maximum entries retained in the uncached-query log (FIFO).
    pub uncached_log_limit: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_seconds: DEFAULT_TTL_SECONDS,
            uncached_log_limit: DEFAULT_UNCACHED_LOG_LIMIT,
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }
}
