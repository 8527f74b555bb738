use std::sync::Arc;

use uuid::Uuid;

use crate::application::engine::QueryEngine;
use crate::application::selection::SelectionService;
use crate::application::stats::StatsService;
use crate::cache::{CacheConfig, TransientStore};

#[derive(Clone)]
pub struct AdminState {
    pub cache_config: CacheConfig,
    pub store: Arc<dyn TransientStore>,
    pub selections: Arc<SelectionService>,
    pub stats: Arc<StatsService>,
    pub engine: Arc<dyn QueryEngine>,
    /// Elevated-privilege bearer token required on every admin request.
    pub admin_token: Arc<str>,
    /// Anti-forgery token embedded in forms and checked on every mutation.
    pub forgery_token: Arc<str>,
}

impl AdminState {
    pub fn new(
        cache_config: CacheConfig,
        store: Arc<dyn TransientStore>,
        selections: Arc<SelectionService>,
        stats: Arc<StatsService>,
        engine: Arc<dyn QueryEngine>,
        admin_token: &str,
    ) -> Self {
        Self {
            cache_config,
            store,
            selections,
            stats,
            engine,
            admin_token: Arc::from(admin_token),
            forgery_token: Arc::from(Uuid::new_v4().to_string().as_str()),
        }
    }
}
