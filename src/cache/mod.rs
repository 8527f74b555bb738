//! Riserva cache system.
//!
//! A single-level, fixed-TTL key/value cache for list-query results:
//!
//! - **Key generator**: deterministic hash over the sorted parameter
//!   mapping, prefixed with a namespace and the matched selector.
//! - **Transient store**: get / set-with-expiry / delete-by-prefix,
//!   injected behind a trait so the host platform's store can back it.
//! - **Interceptor**: the one decision-and-lookup path every integration
//!   point goes through.
//!
//! ## Configuration
//!
//! Cache behavior is controlled via `riserva.toml`:
//!
//! ```toml
//! [cache]
//! enabled = true
//! ttl_seconds = 43200
//! uncached_log_limit = 50
//! ```

mod config;
mod interceptor;
mod key;
pub(crate) mod lock;
mod store;

pub use config::CacheConfig;
pub use interceptor::{CacheOutcome, Interception, InterceptError, QueryInterceptor};
pub use key::{CacheKey, KEY_NAMESPACE, prefix_for};
pub use store::{CacheEntry, MemoryTransientStore, StoreError, TransientStore};
