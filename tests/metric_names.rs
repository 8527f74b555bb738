use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use metrics_util::debugging::DebuggingRecorder;
use riserva::application::engine::{EngineCatalog, EngineError, QueryEngine};
use riserva::application::selection::SelectionService;
use riserva::application::stats::StatsService;
use riserva::application::stores::OptionsStore;
use riserva::cache::{CacheConfig, MemoryTransientStore, QueryInterceptor};
use riserva::domain::query::{KindSpec, QueryDescriptor};
use riserva::domain::selection::SelectionSets;
use riserva::infra::options::MemoryOptionsStore;
use serde_json::json;
use serial_test::serial;

struct StaticEngine;

#[async_trait]
impl QueryEngine for StaticEngine {
    async fn execute(
        &self,
        _descriptor: &QueryDescriptor,
    ) -> Result<Vec<serde_json::Value>, EngineError> {
        Ok(vec![json!({"id": 1})])
    }

    async fn catalog(&self) -> Result<EngineCatalog, EngineError> {
        Ok(EngineCatalog {
            kinds: vec!["products".to_string()],
            taxonomies: vec![],
            listings: vec![],
        })
    }
}

fn query(kind: &str, page: u64) -> QueryDescriptor {
    let mut descriptor = QueryDescriptor {
        kind: Some(KindSpec::One(kind.to_string())),
        taxonomies: vec![],
        listing: None,
        params: Default::default(),
        admin_context: false,
    };
    descriptor.params.insert("page".to_string(), json!(page));
    descriptor
}

#[tokio::test]
#[serial]
async fn interception_paths_emit_expected_metric_keys() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    recorder
        .install()
        .expect("debug metrics recorder should install in this test process");

    let options: Arc<dyn OptionsStore> = Arc::new(MemoryOptionsStore::new());
    let selections = Arc::new(SelectionService::new(Arc::clone(&options)));
    let engine = Arc::new(StaticEngine);
    selections
        .save(
            SelectionSets {
                kinds: vec!["products".to_string()],
                taxonomies: vec![],
                listings: vec![],
            },
            &engine.catalog().await.expect("catalog"),
        )
        .await
        .expect("save selections");

    // A log limit of 1 forces a FIFO eviction on the second miss.
    let stats = Arc::new(StatsService::new(Arc::clone(&options), 1));
    let interceptor = QueryInterceptor::new(
        CacheConfig::default(),
        Arc::new(MemoryTransientStore::new()),
        selections,
        stats,
        engine,
    );

    // miss, hit, miss-with-eviction, bypass
    interceptor.run(&query("products", 1)).await.expect("miss");
    interceptor.run(&query("products", 1)).await.expect("hit");
    interceptor.run(&query("products", 2)).await.expect("evicting miss");
    let mut admin_query = query("products", 3);
    admin_query.admin_context = true;
    interceptor.run(&admin_query).await.expect("bypass");

    let names: HashSet<String> = snapshotter
        .snapshot()
        .into_vec()
        .into_iter()
        .map(|(key, _, _, _)| key.key().name().to_string())
        .collect();

    for expected in [
        "riserva_cache_hit_total",
        "riserva_cache_miss_total",
        "riserva_cache_bypass_total",
        "riserva_uncached_log_evict_total",
    ] {
        assert!(names.contains(expected), "missing metric `{expected}`");
    }
}
