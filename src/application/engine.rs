//! Query-engine collaborator.
//!
//! The external engine executes list queries and exposes the catalogs of
//! identifiers administrators can select from. The interceptor observes
//! queries and can replace their result sets; everything else about the
//! engine is a black box.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::query::QueryDescriptor;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("query execution failed: {message}")]
    Execution { message: String },
}

impl EngineError {
    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution {
            message: message.into(),
        }
    }
}

/// Identifiers the engine knows about, used by the settings form and to
/// sanitize submitted selections.
#[derive(Debug, Clone, Default)]
pub struct EngineCatalog {
    pub kinds: Vec<String>,
    pub taxonomies: Vec<String>,
    pub listings: Vec<String>,
}

/// External query-execution engine.
#[async_trait]
pub trait QueryEngine: Send + Sync {
    /// Execute the query and return its ordered result records.
    async fn execute(&self, descriptor: &QueryDescriptor)
    -> Result<Vec<serde_json::Value>, EngineError>;

    /// Catalogs of selectable identifiers.
    async fn catalog(&self) -> Result<EngineCatalog, EngineError>;
}
