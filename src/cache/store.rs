//! Transient storage for cached result sets.
//!
//! The host platform owns the real store; this module defines the seam the
//! interceptor and the admin surface talk to, plus an in-process
//! implementation. Expiry is passive: an expired entry is treated as a
//! miss and dropped when read. There is no eviction policy beyond TTL.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use time::OffsetDateTime;

use super::lock::{rw_read, rw_write};

const SOURCE: &str = "cache::store";

/// Failure surfaced by the backing store.
///
/// The interceptor never retries or maps these; they propagate untouched,
/// which mirrors the host platform's own error contract.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("transient store unavailable: {message}")]
    Unavailable { message: String },
    #[error("value could not be serialized: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }
}

/// A stored result set with its expiry timestamp.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub records: Vec<serde_json::Value>,
    pub expires_at: OffsetDateTime,
}

impl CacheEntry {
    fn is_expired(&self, now: OffsetDateTime) -> bool {
        self.expires_at <= now
    }
}

/// Generic key/value store with expiry and prefix-pattern deletion.
#[async_trait]
pub trait TransientStore: Send + Sync {
    /// Fetch a live entry. Expired entries read as `None`.
    async fn get(&self, key: &str) -> Result<Option<Vec<serde_json::Value>>, StoreError>;

    /// Store a result set, replacing any previous entry under the key.
    async fn set(
        &self,
        key: &str,
        records: Vec<serde_json::Value>,
        ttl: Duration,
    ) -> Result<(), StoreError>;

    /// Delete every entry whose key starts with `prefix`; returns the count.
    async fn delete_prefix(&self, prefix: &str) -> Result<u64, StoreError>;

    /// Count live entries whose key starts with `prefix`.
    async fn count_prefix(&self, prefix: &str) -> Result<u64, StoreError>;
}

/// In-process transient store.
pub struct MemoryTransientStore {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl MemoryTransientStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryTransientStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TransientStore for MemoryTransientStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<serde_json::Value>>, StoreError> {
        let now = OffsetDateTime::now_utc();
        {
            let entries = rw_read(&self.entries, SOURCE, "get");
            match entries.get(key) {
                Some(entry) if entry.is_expired(now) => {}
                Some(entry) => return Ok(Some(entry.records.clone())),
                None => return Ok(None),
            }
        }
        // Re-check under the write guard: another task may have replaced
        // the entry since the read guard dropped.
        let mut entries = rw_write(&self.entries, SOURCE, "get.expire");
        if entries.get(key).is_some_and(|entry| entry.is_expired(now)) {
            entries.remove(key);
        }
        Ok(None)
    }

    async fn set(
        &self,
        key: &str,
        records: Vec<serde_json::Value>,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        let entry = CacheEntry {
            records,
            expires_at: OffsetDateTime::now_utc() + ttl,
        };
        rw_write(&self.entries, SOURCE, "set").insert(key.to_string(), entry);
        Ok(())
    }

    async fn delete_prefix(&self, prefix: &str) -> Result<u64, StoreError> {
        let mut entries = rw_write(&self.entries, SOURCE, "delete_prefix");
        let before = entries.len();
        entries.retain(|key, _| !key.starts_with(prefix));
        Ok((before - entries.len()) as u64)
    }

    async fn count_prefix(&self, prefix: &str) -> Result<u64, StoreError> {
        let now = OffsetDateTime::now_utc();
        let entries = rw_read(&self.entries, SOURCE, "count_prefix");
        Ok(entries
            .iter()
            .filter(|(key, entry)| key.starts_with(prefix) && !entry.is_expired(now))
            .count() as u64)
    }
}
