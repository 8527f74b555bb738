//! The single query interception path.
//!
//! Every integration point funnels through `QueryInterceptor::run`. The
//! system this replaces registered three overlapping hooks with copies of
//! the same logic, which could count or cache one logical request several
//! times depending on hook order; one path makes the outcome and the
//! counters agree by construction.

use std::sync::Arc;

use metrics::counter;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::application::engine::{EngineError, QueryEngine};
use crate::application::selection::{SelectionError, SelectionService};
use crate::application::stats::{StatsError, StatsService};
use crate::domain::query::QueryDescriptor;
use crate::domain::selection::should_cache;

use super::config::CacheConfig;
use super::key::CacheKey;
use super::store::{StoreError, TransientStore};

#[derive(Debug, Error)]
pub enum InterceptError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Selection(#[from] SelectionError),
    #[error(transparent)]
    Stats(#[from] StatsError),
}

/// How a query moved through the interceptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOutcome {
    /// Admin context, caching disabled, or no selection configured.
    Bypassed,
    /// Evaluated but no allow-listed identifier matched.
    NoMatch,
    /// Served from the transient store.
    Hit,
    /// Executed and stored.
    Miss,
}

impl CacheOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            CacheOutcome::Bypassed => "bypassed",
            CacheOutcome::NoMatch => "no_match",
            CacheOutcome::Hit => "hit",
            CacheOutcome::Miss => "miss",
        }
    }
}

/// Result of running one query through the interceptor.
pub struct Interception {
    pub records: Vec<serde_json::Value>,
    pub outcome: CacheOutcome,
}

pub struct QueryInterceptor {
    config: CacheConfig,
    store: Arc<dyn TransientStore>,
    selections: Arc<SelectionService>,
    stats: Arc<StatsService>,
    engine: Arc<dyn QueryEngine>,
}

impl QueryInterceptor {
    pub fn new(
        config: CacheConfig,
        store: Arc<dyn TransientStore>,
        selections: Arc<SelectionService>,
        stats: Arc<StatsService>,
        engine: Arc<dyn QueryEngine>,
    ) -> Self {
        Self {
            config,
            store,
            selections,
            stats,
            engine,
        }
    }

    /// Run one query through decide → lookup → execute/store.
    ///
    /// Storage failures are not handled here; they propagate through the
    /// store's own error contract.
    #[instrument(skip_all, fields(query = %descriptor))]
    pub async fn run(&self, descriptor: &QueryDescriptor) -> Result<Interception, InterceptError> {
        if !self.config.enabled || descriptor.admin_context {
            return self.bypass(descriptor).await;
        }

        let sets = self.selections.load().await?;
        if sets.is_empty() {
            return self.bypass(descriptor).await;
        }

        // Every query that reaches evaluation counts toward the total,
        // matched or not.
        self.stats.record_query().await?;

        let Some(selector) = should_cache(descriptor, &sets) else {
            debug!(outcome = "no_match", "query outside selection sets");
            let records = self.engine.execute(descriptor).await?;
            return Ok(Interception {
                records,
                outcome: CacheOutcome::NoMatch,
            });
        };

        let key = CacheKey::generate(&selector, &descriptor.params);

        if let Some(records) = self.store.get(key.as_str()).await? {
            self.stats.record_hit().await?;
            counter!("riserva_cache_hit_total").increment(1);
            debug!(key = %key, outcome = "hit", "serving cached result set");
            return Ok(Interception {
                records,
                outcome: CacheOutcome::Hit,
            });
        }

        let records = self.engine.execute(descriptor).await?;
        self.store
            .set(key.as_str(), records.clone(), self.config.ttl())
            .await?;
        self.stats.log_uncached(descriptor).await?;
        counter!("riserva_cache_miss_total").increment(1);
        debug!(key = %key, outcome = "miss", "stored fresh result set");

        Ok(Interception {
            records,
            outcome: CacheOutcome::Miss,
        })
    }

    async fn bypass(&self, descriptor: &QueryDescriptor) -> Result<Interception, InterceptError> {
        counter!("riserva_cache_bypass_total").increment(1);
        debug!(outcome = "bypassed", "query bypassed the cache");
        let records = self.engine.execute(descriptor).await?;
        Ok(Interception {
            records,
            outcome: CacheOutcome::Bypassed,
        })
    }
}
