//! Test doubles shared by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use folio_sdk::traits::value_as_string;
use folio_sdk::{CacheError, LocalCache, MemoryCache, RemoteError, RemoteStore, Row, RowQuery, SyncConfig};
use serde_json::{json, Value};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use std::sync::Mutex;

pub const OWNER_ID: &str = "p1";

pub fn config() -> SyncConfig {
    SyncConfig::new(OWNER_ID)
}

// ==================== Remote store ====================

/// In-memory tables with a call log and an injectable fetch failure
#[derive(Default)]
pub struct InMemoryStore {
    tables: Mutex<HashMap<String, Vec<Row>>>,
    calls: Mutex<Vec<String>>,
    fetch_failure: Mutex<Option<RemoteError>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(self, table: &str, rows: Value) -> Self {
        self.insert(table, rows);
        self
    }

    pub fn insert(&self, table: &str, rows: Value) {
        let rows: Vec<Row> = serde_json::from_value(rows).unwrap();
        self.tables
            .lock()
            .unwrap()
            .entry(table.to_string())
            .or_default()
            .extend(rows);
    }

    pub fn rows(&self, table: &str) -> Vec<Row> {
        self.tables.lock().unwrap().get(table).cloned().unwrap_or_default()
    }

    /// Every later fetch fails with `error`
    pub fn fail_fetches(&self, error: RemoteError) {
        *self.fetch_failure.lock().unwrap() = Some(error);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn log(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl RemoteStore for InMemoryStore {
    async fn fetch_rows(&self, table: &str, query: &RowQuery) -> Result<Vec<Row>, RemoteError> {
        self.log(format!("fetch {}", table));
        if let Some(error) = self.fetch_failure.lock().unwrap().clone() {
            return Err(error);
        }

        let mut rows: Vec<Row> = self
            .rows(table)
            .into_iter()
            .filter(|row| query.matches(row))
            .collect();
        rows.sort_by(|a, b| {
            query
                .order
                .iter()
                .map(|column| compare(a.get(column), b.get(column)))
                .find(|ordering| *ordering != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        });
        Ok(rows)
    }

    async fn upsert_rows(&self, table: &str, rows: Vec<Row>) -> Result<(), RemoteError> {
        self.log(format!("upsert {}", table));
        let mut tables = self.tables.lock().unwrap();
        let existing = tables.entry(table.to_string()).or_default();

        for row in rows {
            // Ids match across string and numeric columns, like the real store's casts
            let id = row.get("id").and_then(value_as_string);
            let current = existing
                .iter_mut()
                .find(|r| id.is_some() && r.get("id").and_then(value_as_string) == id);
            match current {
                Some(current) => current.extend(row),
                None => existing.push(row),
            }
        }
        Ok(())
    }

    async fn delete_rows(&self, table: &str, query: &RowQuery) -> Result<(), RemoteError> {
        self.log(format!("delete {}", table));
        if let Some(rows) = self.tables.lock().unwrap().get_mut(table) {
            rows.retain(|row| !query.matches(row));
        }
        Ok(())
    }

    async fn upload_blob(
        &self,
        bucket: &str,
        path: &str,
        _data: Vec<u8>,
        _content_type: &str,
    ) -> Result<String, RemoteError> {
        self.log(format!("upload {}", bucket));
        Ok(format!("https://blobs.test/{}/{}", bucket, path))
    }
}

fn compare(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a.and_then(Value::as_f64), b.and_then(Value::as_f64)) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => a.and_then(value_as_string).cmp(&b.and_then(value_as_string)),
    }
}

/// Store holding the example profile: photo, resume and one linkedin link
pub fn profile_store() -> InMemoryStore {
    InMemoryStore::new()
        .with_rows(
            "profiles",
            json!([{
                "id": "p1",
                "name": "A",
                "bio": null,
                "photo_url": "https://x/img.png",
                "resume_url": "https://x/cv.pdf"
            }]),
        )
        .with_rows(
            "social_links",
            json!([{ "profile_id": "p1", "platform": "linkedin", "url": "https://li/a" }]),
        )
}

/// `profile_store` plus two connections, one with links and one without
pub fn full_store() -> InMemoryStore {
    profile_store()
        .with_rows(
            "connections",
            json!([
                { "id": "c2", "name": "Zed", "category": "business", "position": 1, "is_special": true },
                { "id": "c1", "name": "Ann", "category": "business", "position": 0, "is_special": false }
            ]),
        )
        .with_rows(
            "connection_social_links",
            json!([{ "connection_id": "c1", "platform": "Twitter", "url": "https://tw/ann" }]),
        )
        .with_rows(
            "family_members",
            json!([{ "id": 7, "name": "Asha", "role": "sister", "photo_url": "https://x/asha.png", "position": 0 }]),
        )
        .with_rows(
            "story_milestones",
            json!([
                { "id": "s2", "title": "Second", "position": 2 },
                { "id": "s1", "title": "First", "position": 1 }
            ]),
        )
}

// ==================== Local caches ====================

/// Rejects any value longer than `limit` bytes with `QuotaExceeded`
pub struct SizeLimitCache {
    inner: MemoryCache,
    limit: usize,
}

impl SizeLimitCache {
    pub fn new(limit: usize) -> Self {
        Self {
            inner: MemoryCache::default(),
            limit,
        }
    }
}

impl LocalCache for SizeLimitCache {
    fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        if value.len() > self.limit {
            return Err(CacheError::QuotaExceeded {
                key: key.to_string(),
                requested: value.len(),
                available: self.limit,
            });
        }
        self.inner.set(key, value)
    }

    fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key)
    }

    fn remove(&self, key: &str) {
        self.inner.remove(key)
    }

    fn clear_all_except(&self, keep: &[&str]) {
        self.inner.clear_all_except(keep)
    }

    fn keys(&self) -> Vec<String> {
        self.inner.keys()
    }

    fn used_bytes(&self) -> usize {
        self.inner.used_bytes()
    }
}

/// Accepts writes to `profileImageUrl` and `resumeUrl` only
#[derive(Default)]
pub struct CriticalOnlyCache {
    inner: MemoryCache,
}

impl LocalCache for CriticalOnlyCache {
    fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        match key {
            "profileImageUrl" | "resumeUrl" => self.inner.set(key, value),
            _ => Err(CacheError::QuotaExceeded {
                key: key.to_string(),
                requested: key.len() + value.len(),
                available: 0,
            }),
        }
    }

    fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key)
    }

    fn remove(&self, key: &str) {
        self.inner.remove(key)
    }

    fn clear_all_except(&self, keep: &[&str]) {
        self.inner.clear_all_except(keep)
    }

    fn keys(&self) -> Vec<String> {
        self.inner.keys()
    }

    fn used_bytes(&self) -> usize {
        self.inner.used_bytes()
    }
}

/// Rejects writes to the listed keys with `QuotaExceeded`
pub struct RejectKeysCache {
    inner: MemoryCache,
    rejected: Vec<String>,
}

impl RejectKeysCache {
    pub fn new(rejected: &[&str]) -> Self {
        Self {
            inner: MemoryCache::default(),
            rejected: rejected.iter().map(|k| k.to_string()).collect(),
        }
    }

    /// Store a value directly, bypassing the rejection list
    pub fn seed(&self, key: &str, value: &str) {
        self.inner.set(key, value).unwrap();
    }
}

impl LocalCache for RejectKeysCache {
    fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        if self.rejected.iter().any(|k| k == key) {
            return Err(CacheError::QuotaExceeded {
                key: key.to_string(),
                requested: key.len() + value.len(),
                available: 0,
            });
        }
        self.inner.set(key, value)
    }

    fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key)
    }

    fn remove(&self, key: &str) {
        self.inner.remove(key)
    }

    fn clear_all_except(&self, keep: &[&str]) {
        self.inner.clear_all_except(keep)
    }

    fn keys(&self) -> Vec<String> {
        self.inner.keys()
    }

    fn used_bytes(&self) -> usize {
        self.inner.used_bytes()
    }
}

/// Every write fails with a non-quota backend error; counts clears
#[derive(Default)]
pub struct BrokenCache {
    inner: MemoryCache,
    clears: AtomicUsize,
}

impl BrokenCache {
    pub fn clears(&self) -> usize {
        self.clears.load(AtomicOrdering::SeqCst)
    }
}

impl LocalCache for BrokenCache {
    fn set(&self, _key: &str, _value: &str) -> Result<(), CacheError> {
        Err(CacheError::Backend("disk unavailable".into()))
    }

    fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key)
    }

    fn remove(&self, key: &str) {
        self.inner.remove(key)
    }

    fn clear_all_except(&self, keep: &[&str]) {
        self.clears.fetch_add(1, AtomicOrdering::SeqCst);
        self.inner.clear_all_except(keep)
    }

    fn keys(&self) -> Vec<String> {
        self.inner.keys()
    }

    fn used_bytes(&self) -> usize {
        self.inner.used_bytes()
    }
}
