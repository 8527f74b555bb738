//! Administrator-configured selection sets and the caching decision.
//!
//! The decision used to live in three near-identical interception hooks in
//! the system this replaces. It is collapsed here into one pure function,
//! `should_cache`, so every integration point shares a single outcome and
//! counters cannot drift apart.

use serde::{Deserialize, Serialize};

use super::query::{KindSpec, QueryDescriptor};

/// The three independent allow-lists caching is keyed on.
///
/// Persisted individually in the options store and read on every
/// interception. An empty triple disables caching entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionSets {
    #[serde(default)]
    pub kinds: Vec<String>,
    #[serde(default)]
    pub taxonomies: Vec<String>,
    #[serde(default)]
    pub listings: Vec<String>,
}

impl SelectionSets {
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty() && self.taxonomies.is_empty() && self.listings.is_empty()
    }
}

/// The identifier that matched the allow-list, carried into the cache key
/// so administrator prefix-deletion can find the entries it produced.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    Kind(String),
    Taxonomy(String),
    Listing(String),
}

impl Selector {
    /// Stable key segment for this selector, e.g. `kind=products`.
    pub fn tag(&self) -> String {
        match self {
            Selector::Kind(id) => format!("kind={id}"),
            Selector::Taxonomy(id) => format!("tax={id}"),
            Selector::Listing(id) => format!("listing={id}"),
        }
    }
}

/// Decide whether a query is cacheable under the configured selection sets.
///
/// Returns the matching selector, or `None` when the query does not touch
/// any allow-listed identifier. Precedence follows the original behavior:
/// kinds, then taxonomies, then listings.
///
/// The `any` pseudo-kind matches iff the kind allow-list is non-empty.
pub fn should_cache(descriptor: &QueryDescriptor, sets: &SelectionSets) -> Option<Selector> {
    match &descriptor.kind {
        Some(spec) if spec.is_any() => {
            if !sets.kinds.is_empty() {
                return Some(Selector::Kind(KindSpec::ANY.to_string()));
            }
        }
        Some(KindSpec::One(kind)) => {
            if sets.kinds.iter().any(|k| k == kind) {
                return Some(Selector::Kind(kind.clone()));
            }
        }
        Some(KindSpec::Many(kinds)) => {
            if let Some(kind) = kinds.iter().find(|k| sets.kinds.contains(k)) {
                return Some(Selector::Kind(kind.clone()));
            }
        }
        None => {}
    }

    for clause in &descriptor.taxonomies {
        if sets.taxonomies.iter().any(|t| *t == clause.taxonomy) {
            return Some(Selector::Taxonomy(clause.taxonomy.clone()));
        }
    }

    if let Some(listing) = &descriptor.listing {
        if sets.listings.iter().any(|l| l == listing) {
            return Some(Selector::Listing(listing.clone()));
        }
    }

    None
}
