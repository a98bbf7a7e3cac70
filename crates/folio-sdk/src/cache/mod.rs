//! Local cache for display-ready snapshots
//!
//! A synchronous, quota-bounded key/value store plus typed accessors keyed by
//! [`CacheKey`]. The cache is disposable: the remote store is authoritative.

mod file;
mod keys;
mod local;
mod typed;

pub use file::FileCache;
pub use keys::CacheKey;
pub use local::{CacheError, LocalCache, MemoryCache, DEFAULT_QUOTA_BYTES};
pub use typed::TypedCache;

pub(crate) use typed::encode;
