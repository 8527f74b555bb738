//! In-process query engine.
//!
//! A fixture engine for the standalone binary and tests: result records
//! are registered per kind, and the catalog is fixed at construction.
//! Deployments embedding riserva into a real content framework implement
//! `QueryEngine` over the framework's query layer instead.

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;

use crate::application::engine::{EngineCatalog, EngineError, QueryEngine};
use crate::cache::lock::{rw_read, rw_write};
use crate::domain::query::{KindSpec, QueryDescriptor};

const SOURCE: &str = "infra::engine";

pub struct MemoryQueryEngine {
    catalog: EngineCatalog,
    records_by_kind: RwLock<HashMap<String, Vec<serde_json::Value>>>,
    executions: AtomicU64,
}

impl MemoryQueryEngine {
    pub fn new(catalog: EngineCatalog) -> Self {
        Self {
            catalog,
            records_by_kind: RwLock::new(HashMap::new()),
            executions: AtomicU64::new(0),
        }
    }

    pub fn register(&self, kind: &str, record: serde_json::Value) {
        rw_write(&self.records_by_kind, SOURCE, "register")
            .entry(kind.to_string())
            .or_default()
            .push(record);
    }

    /// Number of times `execute` ran, for asserting cache effectiveness.
    pub fn executions(&self) -> u64 {
        self.executions.load(Ordering::SeqCst)
    }

    fn kinds_for(&self, descriptor: &QueryDescriptor) -> Vec<String> {
        match &descriptor.kind {
            Some(spec) if spec.is_any() => self.catalog.kinds.clone(),
            Some(KindSpec::One(kind)) => vec![kind.clone()],
            Some(KindSpec::Many(kinds)) => kinds.clone(),
            None => self.catalog.kinds.clone(),
        }
    }
}

#[async_trait]
impl QueryEngine for MemoryQueryEngine {
    async fn execute(
        &self,
        descriptor: &QueryDescriptor,
    ) -> Result<Vec<serde_json::Value>, EngineError> {
        self.executions.fetch_add(1, Ordering::SeqCst);
        let records = rw_read(&self.records_by_kind, SOURCE, "execute");
        let mut results = Vec::new();
        for kind in self.kinds_for(descriptor) {
            if let Some(found) = records.get(&kind) {
                results.extend(found.iter().cloned());
            }
        }
        Ok(results)
    }

    async fn catalog(&self) -> Result<EngineCatalog, EngineError> {
        Ok(self.catalog.clone())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use serde_json::json;

    use super::*;

    fn engine() -> MemoryQueryEngine {
        let engine = MemoryQueryEngine::new(EngineCatalog {
            kinds: vec!["products".to_string(), "events".to_string()],
            taxonomies: vec!["region".to_string()],
            listings: vec!["featured".to_string()],
        });
        engine.register("products", json!({"id": 1}));
        engine.register("events", json!({"id": 2}));
        engine
    }

    fn query(kind: &str) -> QueryDescriptor {
        QueryDescriptor {
            kind: Some(KindSpec::One(kind.to_string())),
            taxonomies: vec![],
            listing: None,
            params: BTreeMap::new(),
            admin_context: false,
        }
    }

    #[tokio::test]
    async fn executes_by_kind() {
        let engine = engine();
        let records = engine.execute(&query("products")).await.expect("execute");
        assert_eq!(records, vec![json!({"id": 1})]);
        assert_eq!(engine.executions(), 1);
    }

    #[tokio::test]
    async fn any_kind_spans_catalog() {
        let engine = engine();
        let records = engine.execute(&query("any")).await.expect("execute");
        assert_eq!(records.len(), 2);
    }
}
