//! Settings-store seam.
//!
//! The host platform provides a generic get/set-by-name options store; the
//! selection sets, counters, uncached-query log, and last-cleared timestamp
//! all live behind this trait. Read-modify-write is not atomic and is not
//! meant to be: concurrent increments can lose updates, statistics are
//! best-effort.

use async_trait::async_trait;

pub use crate::cache::StoreError;

/// Generic named-value settings store.
#[async_trait]
pub trait OptionsStore: Send + Sync {
    async fn get(&self, name: &str) -> Result<Option<serde_json::Value>, StoreError>;
    async fn set(&self, name: &str, value: serde_json::Value) -> Result<(), StoreError>;
    async fn delete(&self, name: &str) -> Result<(), StoreError>;
}
