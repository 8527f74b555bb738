//! List-query descriptors observed from the host query engine.
//!
//! A `QueryDescriptor` is the read-only view the interceptor gets of an
//! in-flight list query: the content kind selector, taxonomy clauses, an
//! optional named listing, and the full parameter mapping used for cache
//! key generation.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Content kind selector of a list query.
///
/// The host engine expresses the kind either as a single identifier or as
/// a list of identifiers. The literal identifier `any` is a pseudo-kind
/// that matches every configured kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KindSpec {
    One(String),
    Many(Vec<String>),
}

impl KindSpec {
    pub const ANY: &'static str = "any";

    pub fn is_any(&self) -> bool {
        matches!(self, KindSpec::One(kind) if kind == Self::ANY)
    }
}

/// A single taxonomy clause of a list query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomyClause {
    pub taxonomy: String,
    #[serde(default)]
    pub terms: Vec<String>,
}

/// An in-flight list query as seen by the interceptor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryDescriptor {
    /// Content kind selector, absent for queries without a kind constraint.
    #[serde(default)]
    pub kind: Option<KindSpec>,
    /// Taxonomy clauses attached to the query.
    #[serde(default)]
    pub taxonomies: Vec<TaxonomyClause>,
    /// Named listing template driving the query, if any.
    #[serde(default)]
    pub listing: Option<String>,
    /// Full parameter mapping of the query. A `BTreeMap` keeps the mapping
    /// ordered independently of the order parameters arrived in.
    #[serde(default)]
    pub params: BTreeMap<String, serde_json::Value>,
    /// True when the query originates from an administrative context.
    /// Admin traffic always bypasses the cache.
    #[serde(default)]
    pub admin_context: bool,
}

impl QueryDescriptor {
    /// Render a short diagnostic form of the query for the uncached log.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for QueryDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            Some(KindSpec::One(kind)) => write!(f, "kind={kind}")?,
            Some(KindSpec::Many(kinds)) => write!(f, "kind={}", kinds.join("|"))?,
            None => write!(f, "kind=-")?,
        }
        for clause in &self.taxonomies {
            write!(f, " tax={}", clause.taxonomy)?;
            if !clause.terms.is_empty() {
                write!(f, "[{}]", clause.terms.join(","))?;
            }
        }
        if let Some(listing) = &self.listing {
            write!(f, " listing={listing}")?;
        }
        Ok(())
    }
}
