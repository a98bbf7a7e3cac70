//! Size-bounded key/value storage
//!
//! Quota accounting matches browser origin storage: an entry costs
//! `key.len() + value.len()` bytes and replacing a key is charged only the
//! difference. A write that does not fit fails with `QuotaExceeded` and leaves
//! the previous value in place.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;

/// Default capacity, the common per-origin storage limit
pub const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;

/// Local cache failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Storage is full; the only failure that triggers degradation
    #[error("Quota exceeded writing {key}: {requested} bytes requested, {available} available")]
    QuotaExceeded {
        key: String,
        requested: usize,
        available: usize,
    },

    /// Value could not be encoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Backing storage failed (I/O, corrupt file)
    #[error("Storage backend error: {0}")]
    Backend(String),
}

impl CacheError {
    pub fn is_quota(&self) -> bool {
        matches!(self, CacheError::QuotaExceeded { .. })
    }
}

/// Synchronous key/value store with a capacity limit
///
/// All operations are local and never suspend. `remove` is idempotent.
pub trait LocalCache: Send + Sync {
    /// Store `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &str) -> Result<(), CacheError>;

    fn get(&self, key: &str) -> Option<String>;

    fn remove(&self, key: &str);

    /// Remove every key not listed in `keep`
    fn clear_all_except(&self, keep: &[&str]);

    /// Keys currently stored, sorted
    fn keys(&self) -> Vec<String>;

    /// Bytes currently charged against the quota
    fn used_bytes(&self) -> usize;

    /// Capacity in bytes, if bounded
    fn quota_bytes(&self) -> Option<usize> {
        None
    }
}

/// Entry map with quota bookkeeping, shared by the cache implementations
#[derive(Debug, Clone, Default)]
pub(crate) struct Entries {
    map: BTreeMap<String, String>,
    used: usize,
    quota: usize,
}

impl Entries {
    pub(crate) fn new(quota: usize) -> Self {
        Self {
            map: BTreeMap::new(),
            used: 0,
            quota,
        }
    }

    /// Load existing entries; they are kept even when over quota
    pub(crate) fn from_map(map: BTreeMap<String, String>, quota: usize) -> Self {
        let used = map.iter().map(|(k, v)| cost(k, v)).sum();
        Self { map, used, quota }
    }

    pub(crate) fn map(&self) -> &BTreeMap<String, String> {
        &self.map
    }

    /// Insert, returning the replaced value
    pub(crate) fn try_set(&mut self, key: &str, value: &str) -> Result<Option<String>, CacheError> {
        let existing = self.map.get(key).map(|v| cost(key, v)).unwrap_or(0);
        let requested = cost(key, value);
        let after = self.used - existing + requested;

        if after > self.quota {
            return Err(CacheError::QuotaExceeded {
                key: key.to_string(),
                requested,
                available: self.quota.saturating_sub(self.used - existing),
            });
        }

        self.used = after;
        Ok(self.map.insert(key.to_string(), value.to_string()))
    }

    /// Put back a value displaced by a write that could not be persisted
    pub(crate) fn restore(&mut self, key: &str, previous: Option<String>) {
        self.remove(key);
        if let Some(value) = previous {
            self.used += cost(key, &value);
            self.map.insert(key.to_string(), value);
        }
    }

    pub(crate) fn get(&self, key: &str) -> Option<String> {
        self.map.get(key).cloned()
    }

    pub(crate) fn remove(&mut self, key: &str) -> Option<String> {
        let removed = self.map.remove(key);
        if let Some(ref value) = removed {
            self.used -= cost(key, value);
        }
        removed
    }

    pub(crate) fn retain(&mut self, keep: &[&str]) -> usize {
        let before = self.map.len();
        self.map.retain(|k, _| keep.contains(&k.as_str()));
        self.used = self.map.iter().map(|(k, v)| cost(k, v)).sum();
        before - self.map.len()
    }

    pub(crate) fn keys(&self) -> Vec<String> {
        self.map.keys().cloned().collect()
    }

    pub(crate) fn used(&self) -> usize {
        self.used
    }

    pub(crate) fn quota(&self) -> usize {
        self.quota
    }
}

fn cost(key: &str, value: &str) -> usize {
    key.len() + value.len()
}

/// Process-local cache with a byte quota
#[derive(Debug)]
pub struct MemoryCache {
    entries: Mutex<Entries>,
}

impl MemoryCache {
    pub fn new(quota_bytes: usize) -> Self {
        Self {
            entries: Mutex::new(Entries::new(quota_bytes)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Entries> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new(DEFAULT_QUOTA_BYTES)
    }
}

impl LocalCache for MemoryCache {
    fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        self.lock().try_set(key, value).map(|_| ())
    }

    fn get(&self, key: &str) -> Option<String> {
        self.lock().get(key)
    }

    fn remove(&self, key: &str) {
        self.lock().remove(key);
    }

    fn clear_all_except(&self, keep: &[&str]) {
        let removed = self.lock().retain(keep);
        tracing::debug!(removed, "Cleared local cache");
    }

    fn keys(&self) -> Vec<String> {
        self.lock().keys()
    }

    fn used_bytes(&self) -> usize {
        self.lock().used()
    }

    fn quota_bytes(&self) -> Option<usize> {
        Some(self.lock().quota())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let cache = MemoryCache::default();
        cache.set("resumeUrl", "https://x/cv.pdf").unwrap();
        assert_eq!(cache.get("resumeUrl").as_deref(), Some("https://x/cv.pdf"));

        cache.remove("resumeUrl");
        cache.remove("resumeUrl");
        assert_eq!(cache.get("resumeUrl"), None);
        assert_eq!(cache.used_bytes(), 0);
    }

    #[test]
    fn test_quota_exceeded_keeps_previous_value() {
        let cache = MemoryCache::new(20);
        cache.set("k", "small").unwrap();

        let err = cache.set("k", "a value that is far too long").unwrap_err();
        assert!(err.is_quota());
        assert_eq!(cache.get("k").as_deref(), Some("small"));
        assert_eq!(cache.used_bytes(), 6);
    }

    #[test]
    fn test_replacement_is_charged_only_the_delta() {
        let cache = MemoryCache::new(12);
        cache.set("key", "123456789").unwrap();
        // Same size again fits even though the cache is full.
        cache.set("key", "987654321").unwrap();
        assert_eq!(cache.used_bytes(), 12);
    }

    #[test]
    fn test_quota_error_reports_available_space() {
        let cache = MemoryCache::new(10);
        cache.set("a", "1234").unwrap();
        match cache.set("b", "123456789") {
            Err(CacheError::QuotaExceeded {
                key,
                requested,
                available,
            }) => {
                assert_eq!(key, "b");
                assert_eq!(requested, 10);
                assert_eq!(available, 5);
            }
            other => panic!("expected quota error, got {:?}", other),
        }
    }

    #[test]
    fn test_clear_all_except() {
        let cache = MemoryCache::default();
        for key in ["profileImageUrl", "resumeUrl", "connections", "familyMembers"] {
            cache.set(key, "v").unwrap();
        }

        cache.clear_all_except(&["profileImageUrl", "resumeUrl"]);

        assert_eq!(cache.keys(), vec!["profileImageUrl", "resumeUrl"]);
        assert_eq!(cache.used_bytes(), "profileImageUrl".len() + "resumeUrl".len() + 2);
    }

    #[test]
    fn test_restore_puts_back_previous() {
        let mut entries = Entries::new(100);
        entries.try_set("k", "old").unwrap();
        let previous = entries.try_set("k", "newer").unwrap();
        entries.restore("k", previous);
        assert_eq!(entries.get("k").as_deref(), Some("old"));
        assert_eq!(entries.used(), 4);
    }
}
