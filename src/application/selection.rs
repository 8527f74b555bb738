//! Selection-set persistence and sanitization.

use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::application::engine::EngineCatalog;
use crate::application::stores::{OptionsStore, StoreError};
use crate::domain::selection::SelectionSets;

pub const OPTION_SELECTED_KINDS: &str = "riserva_selected_kinds";
pub const OPTION_SELECTED_TAXONOMIES: &str = "riserva_selected_taxonomies";
pub const OPTION_SELECTED_LISTINGS: &str = "riserva_selected_listings";

#[derive(Debug, Error)]
pub enum SelectionError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Loads and persists the three allow-lists, sanitizing writes against the
/// engine catalog. Identifiers the engine does not know are silently
/// dropped, never rejected.
pub struct SelectionService {
    options: Arc<dyn OptionsStore>,
}

impl SelectionService {
    pub fn new(options: Arc<dyn OptionsStore>) -> Self {
        Self { options }
    }

    pub async fn load(&self) -> Result<SelectionSets, SelectionError> {
        Ok(SelectionSets {
            kinds: self.load_list(OPTION_SELECTED_KINDS).await?,
            taxonomies: self.load_list(OPTION_SELECTED_TAXONOMIES).await?,
            listings: self.load_list(OPTION_SELECTED_LISTINGS).await?,
        })
    }

    /// Sanitize against the catalog and persist each list individually.
    /// Returns what was actually stored.
    pub async fn save(
        &self,
        submitted: SelectionSets,
        catalog: &EngineCatalog,
    ) -> Result<SelectionSets, SelectionError> {
        let sanitized = SelectionSets {
            kinds: retain_known(submitted.kinds, &catalog.kinds),
            taxonomies: retain_known(submitted.taxonomies, &catalog.taxonomies),
            listings: retain_known(submitted.listings, &catalog.listings),
        };

        debug!(
            kinds = sanitized.kinds.len(),
            taxonomies = sanitized.taxonomies.len(),
            listings = sanitized.listings.len(),
            "persisting selection sets"
        );

        self.store_list(OPTION_SELECTED_KINDS, &sanitized.kinds)
            .await?;
        self.store_list(OPTION_SELECTED_TAXONOMIES, &sanitized.taxonomies)
            .await?;
        self.store_list(OPTION_SELECTED_LISTINGS, &sanitized.listings)
            .await?;

        Ok(sanitized)
    }

    async fn load_list(&self, name: &str) -> Result<Vec<String>, SelectionError> {
        let value = self.options.get(name).await?;
        Ok(value
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default())
    }

    async fn store_list(&self, name: &str, list: &[String]) -> Result<(), SelectionError> {
        self.options
            .set(name, serde_json::json!(list))
            .await
            .map_err(SelectionError::from)
    }
}

fn retain_known(submitted: Vec<String>, known: &[String]) -> Vec<String> {
    submitted
        .into_iter()
        .filter(|id| known.iter().any(|k| k == id))
        .collect()
}
