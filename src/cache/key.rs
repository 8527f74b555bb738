//! Cache key generation.
//!
//! Keys are `riserva:q:<selector-tag>:<16-hex-digest>`. The digest is a
//! 64-bit content hash over the canonically serialized parameter mapping,
//! so the same mapping always yields the same key regardless of the order
//! parameters arrived in. The selector segment keeps administrator
//! prefix-deletion meaningful: every entry names the identifier that made
//! it cacheable.

use std::collections::BTreeMap;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::domain::selection::Selector;

/// Namespace tag prefixed to every cache key.
pub const KEY_NAMESPACE: &str = "riserva:q";

/// A fully rendered cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Generate the key for a parameter mapping under a matched selector.
    ///
    /// The mapping is a `BTreeMap`, so serialization order is the sorted
    /// key order by construction; nested objects inside `serde_json::Value`
    /// are likewise sorted maps.
    pub fn generate(selector: &Selector, params: &BTreeMap<String, serde_json::Value>) -> Self {
        let serialized =
            serde_json::to_string(params).unwrap_or_else(|_| String::from("<unserializable>"));
        let mut hasher = DefaultHasher::new();
        serialized.hash(&mut hasher);
        let digest = hasher.finish();
        Self(format!("{KEY_NAMESPACE}:{}:{digest:016x}", selector.tag()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Key prefix shared by all entries produced under a selector.
pub fn prefix_for(selector: &Selector) -> String {
    format!("{KEY_NAMESPACE}:{}:", selector.tag())
}
