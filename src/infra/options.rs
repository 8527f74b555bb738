//! In-process options store.
//!
//! Stands in for the host platform's settings store in the standalone
//! binary and in tests. No atomicity across get/set, by the same contract
//! as the real thing.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::application::stores::{OptionsStore, StoreError};
use crate::cache::lock::{rw_read, rw_write};

const SOURCE: &str = "infra::options";

pub struct MemoryOptionsStore {
    values: RwLock<HashMap<String, serde_json::Value>>,
}

impl MemoryOptionsStore {
    pub fn new() -> Self {
        Self {
            values: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryOptionsStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OptionsStore for MemoryOptionsStore {
    async fn get(&self, name: &str) -> Result<Option<serde_json::Value>, StoreError> {
        Ok(rw_read(&self.values, SOURCE, "get").get(name).cloned())
    }

    async fn set(&self, name: &str, value: serde_json::Value) -> Result<(), StoreError> {
        rw_write(&self.values, SOURCE, "set").insert(name.to_string(), value);
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<(), StoreError> {
        rw_write(&self.values, SOURCE, "delete").remove(name);
        Ok(())
    }
}
