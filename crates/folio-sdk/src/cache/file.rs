//! File-backed local cache
//!
//! Entries persist across sessions as a single JSON object file. Every
//! mutation rewrites the file through a sibling temp file and a rename, so a
//! crash leaves either the old or the new contents.
//!
//! Removals cannot fail: if the rewrite after `remove` or `clear_all_except`
//! fails, the entry is gone from memory at once and the failure is logged.
//! The file catches up on the next successful write, which stores the whole
//! map.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use super::local::{CacheError, Entries, LocalCache};

/// Quota-bounded cache persisted to one JSON file
#[derive(Debug)]
pub struct FileCache {
    path: PathBuf,
    entries: Mutex<Entries>,
}

impl FileCache {
    /// Open (or start) a cache file
    ///
    /// A missing file is an empty cache. Unreadable contents are an error so
    /// a corrupt file is never silently overwritten.
    pub fn open(path: impl Into<PathBuf>, quota_bytes: usize) -> Result<Self, CacheError> {
        let path = path.into();

        let map: BTreeMap<String, String> = if path.exists() {
            let content = fs::read_to_string(&path)
                .map_err(|e| CacheError::Backend(format!("{}: {}", path.display(), e)))?;
            if content.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&content)
                    .map_err(|e| CacheError::Backend(format!("{}: {}", path.display(), e)))?
            }
        } else {
            BTreeMap::new()
        };

        let entries = Entries::from_map(map, quota_bytes);
        tracing::debug!(
            path = %path.display(),
            keys = entries.map().len(),
            used = entries.used(),
            "Opened file cache"
        );

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> MutexGuard<'_, Entries> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn persist(&self, entries: &Entries) -> Result<(), CacheError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| CacheError::Backend(e.to_string()))?;
            }
        }

        let json = serde_json::to_string(entries.map())
            .map_err(|e| CacheError::Serialization(e.to_string()))?;

        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json).map_err(|e| CacheError::Backend(e.to_string()))?;
        fs::rename(&tmp, &self.path).map_err(|e| CacheError::Backend(e.to_string()))?;
        Ok(())
    }

    fn persist_or_warn(&self, entries: &Entries) {
        if let Err(e) = self.persist(entries) {
            tracing::warn!(
                path = %self.path.display(),
                "Failed to persist cache, file still holds removed keys until the next write: {}",
                e
            );
        }
    }
}

impl LocalCache for FileCache {
    fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        let mut entries = self.lock();
        let previous = entries.try_set(key, value)?;

        if let Err(e) = self.persist(&entries) {
            entries.restore(key, previous);
            return Err(e);
        }
        Ok(())
    }

    fn get(&self, key: &str) -> Option<String> {
        self.lock().get(key)
    }

    fn remove(&self, key: &str) {
        let mut entries = self.lock();
        if entries.remove(key).is_some() {
            self.persist_or_warn(&entries);
        }
    }

    fn clear_all_except(&self, keep: &[&str]) {
        let mut entries = self.lock();
        if entries.retain(keep) > 0 {
            self.persist_or_warn(&entries);
        }
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
    use tempfile::TempDir;

    #[test]
    fn test_entries_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");

        {
            let cache = FileCache::open(&path, 1024).unwrap();
            cache.set("profileImageUrl", "https://x/img.png").unwrap();
            cache.set("resumeUrl", "https://x/cv.pdf").unwrap();
            cache.remove("resumeUrl");
        }

        let cache = FileCache::open(&path, 1024).unwrap();
        assert_eq!(cache.get("profileImageUrl").as_deref(), Some("https://x/img.png"));
        assert_eq!(cache.get("resumeUrl"), None);
        assert_eq!(
            cache.used_bytes(),
            "profileImageUrl".len() + "https://x/img.png".len()
        );
    }

    #[test]
    fn test_quota_failure_does_not_touch_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");

        let cache = FileCache::open(&path, 16).unwrap();
        cache.set("k", "v").unwrap();
        let before = fs::read_to_string(&path).unwrap();

        assert!(cache.set("big", "0123456789abcdef").unwrap_err().is_quota());
        assert_eq!(fs::read_to_string(&path).unwrap(), before);
    }

    #[test]
    fn test_corrupt_file_is_backend_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");
        fs::write(&path, "{not json").unwrap();

        assert!(matches!(
            FileCache::open(&path, 1024),
            Err(CacheError::Backend(_))
        ));
    }

    #[test]
    fn test_clear_all_except_persists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("cache.json");

        let cache = FileCache::open(&path, 1024).unwrap();
        cache.set("resumeUrl", "r").unwrap();
        cache.set("connections", "[]").unwrap();
        cache.clear_all_except(&["resumeUrl"]);
        drop(cache);

        let cache = FileCache::open(&path, 1024).unwrap();
        assert_eq!(cache.keys(), vec!["resumeUrl"]);
    }

    #[test]
    fn test_failed_remove_is_written_by_next_set() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");

        let cache = FileCache::open(&path, 1024).unwrap();
        cache.set("connections", "[]").unwrap();
        cache.set("resumeUrl", "r").unwrap();

        // A directory in the temp file's place makes every rewrite fail
        let blocker = path.with_extension("tmp");
        fs::create_dir(&blocker).unwrap();

        cache.remove("connections");
        assert_eq!(cache.get("connections"), None);
        assert!(cache.set("profileImageUrl", "p").is_err());
        assert!(fs::read_to_string(&path).unwrap().contains("connections"));

        fs::remove_dir(&blocker).unwrap();
        cache.set("profileImageUrl", "p").unwrap();
        drop(cache);

        let cache = FileCache::open(&path, 1024).unwrap();
        assert_eq!(cache.get("connections"), None);
        assert_eq!(cache.get("resumeUrl").as_deref(), Some("r"));
        assert_eq!(cache.get("profileImageUrl").as_deref(), Some("p"));
    }
}
