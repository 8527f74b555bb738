//! Counters, the uncached-query log, and derived statistics.
//!
//! All state lives in the options store. Increments are plain
//! read-modify-write; lost updates under concurrency are tolerated because
//! the numbers are diagnostic, not billing.

use std::collections::BTreeMap;
use std::sync::Arc;

use metrics::counter;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;

use crate::application::stores::{OptionsStore, StoreError};
use crate::domain::query::QueryDescriptor;

pub const OPTION_TOTAL_QUERIES: &str = "riserva_total_queries";
pub const OPTION_CACHE_HITS: &str = "riserva_cache_hits";
pub const OPTION_UNCACHED_QUERIES: &str = "riserva_uncached_queries";
pub const OPTION_LAST_CLEARED: &str = "riserva_last_cleared";

#[derive(Debug, Error)]
pub enum StatsError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// One entry of the uncached-query log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UncachedQuery {
    #[serde(with = "time::serde::rfc3339")]
    pub time: OffsetDateTime,
    pub query: String,
    pub params: BTreeMap<String, serde_json::Value>,
}

/// Aggregate view rendered on the admin page.
#[derive(Debug, Clone)]
pub struct StatsSummary {
    pub total_queries: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub hit_percentage: f64,
    pub last_cleared: Option<OffsetDateTime>,
}

pub struct StatsService {
    options: Arc<dyn OptionsStore>,
    uncached_log_limit: usize,
}

impl StatsService {
    pub fn new(options: Arc<dyn OptionsStore>, uncached_log_limit: usize) -> Self {
        Self {
            options,
            uncached_log_limit,
        }
    }

    /// Count one evaluated query.
    pub async fn record_query(&self) -> Result<(), StatsError> {
        self.increment(OPTION_TOTAL_QUERIES).await
    }

    /// Count one cache hit. Callers must have counted the query first so
    /// hits never exceed totals.
    pub async fn record_hit(&self) -> Result<(), StatsError> {
        self.increment(OPTION_CACHE_HITS).await
    }

    /// Append to the uncached-query log, dropping the oldest entry once
    /// the configured maximum is reached.
    pub async fn log_uncached(&self, descriptor: &QueryDescriptor) -> Result<(), StatsError> {
        let mut log = self.uncached_log().await?;
        while log.len() >= self.uncached_log_limit {
            log.remove(0);
            counter!("riserva_uncached_log_evict_total").increment(1);
        }
        log.push(UncachedQuery {
            time: OffsetDateTime::now_utc(),
            query: descriptor.render(),
            params: descriptor.params.clone(),
        });
        self.options
            .set(
                OPTION_UNCACHED_QUERIES,
                serde_json::to_value(&log).map_err(StoreError::from)?,
            )
            .await?;
        Ok(())
    }

    pub async fn uncached_log(&self) -> Result<Vec<UncachedQuery>, StatsError> {
        let value = self.options.get(OPTION_UNCACHED_QUERIES).await?;
        Ok(value
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default())
    }

    pub async fn summary(&self) -> Result<StatsSummary, StatsError> {
        let total_queries = self.read_counter(OPTION_TOTAL_QUERIES).await?;
        let cache_hits = self.read_counter(OPTION_CACHE_HITS).await?;
        let cache_misses = total_queries.saturating_sub(cache_hits);
        let hit_percentage = if total_queries > 0 {
            (cache_hits as f64 / total_queries as f64) * 100.0
        } else {
            0.0
        };
        let last_cleared = self
            .options
            .get(OPTION_LAST_CLEARED)
            .await?
            .and_then(|v| serde_json::from_value::<i64>(v).ok())
            .and_then(|ts| OffsetDateTime::from_unix_timestamp(ts).ok());

        Ok(StatsSummary {
            total_queries,
            cache_hits,
            cache_misses,
            hit_percentage,
            last_cleared,
        })
    }

    /// Zero both counters, empty the log, and stamp the clearing time.
    pub async fn reset(&self, cleared_at: OffsetDateTime) -> Result<(), StatsError> {
        self.options
            .set(OPTION_TOTAL_QUERIES, serde_json::json!(0))
            .await?;
        self.options
            .set(OPTION_CACHE_HITS, serde_json::json!(0))
            .await?;
        self.options
            .set(OPTION_UNCACHED_QUERIES, serde_json::json!([]))
            .await?;
        self.options
            .set(
                OPTION_LAST_CLEARED,
                serde_json::json!(cleared_at.unix_timestamp()),
            )
            .await?;
        Ok(())
    }

    async fn increment(&self, name: &str) -> Result<(), StatsError> {
        let current = self.read_counter_by(name).await?;
        self.options
            .set(name, serde_json::json!(current + 1))
            .await?;
        Ok(())
    }

    async fn read_counter(&self, name: &str) -> Result<u64, StatsError> {
        self.read_counter_by(name).await
    }

    async fn read_counter_by(&self, name: &str) -> Result<u64, StatsError> {
        let value = self.options.get(name).await?;
        Ok(value
            .and_then(|v| serde_json::from_value::<u64>(v).ok())
            .unwrap_or(0))
    }
}
