//! Sync orchestrator
//!
//! Pulls one entity class from the remote store, normalizes it, and stores the
//! snapshot in the local cache, degrading when the cache is full.

use std::sync::Arc;

use super::degrade::{degrade, storage_failure};
use super::fetch::{EntityFetcher, Snapshot};
use super::mirror::mirror_profile;
use super::report::{SyncReport, SyncState};
use crate::cache::{LocalCache, TypedCache};
use crate::config::SyncConfig;
use crate::model::EntityKind;
use crate::traits::RemoteStore;

/// Drives `Idle → Fetching → Normalizing → Persisting → …` for one entity class
///
/// # Example
///
/// ```rust,ignore
/// use folio_sdk::{EntityKind, MemoryCache, SyncConfig, SyncOrchestrator};
///
/// let orchestrator = SyncOrchestrator::new(
///     Arc::new(store_client),
///     Arc::new(MemoryCache::default()),
///     SyncConfig::new("owner-1"),
/// );
///
/// let report = orchestrator.sync_entity_class(EntityKind::Profile).await;
/// println!("{}", report.notification());
/// ```
#[derive(Clone)]
pub struct SyncOrchestrator {
    fetcher: EntityFetcher,
    cache: TypedCache,
}

impl SyncOrchestrator {
    pub fn new(remote: Arc<dyn RemoteStore>, cache: Arc<dyn LocalCache>, config: SyncConfig) -> Self {
        Self {
            fetcher: EntityFetcher::new(remote, config),
            cache: TypedCache::new(cache),
        }
    }

    pub fn cache(&self) -> &TypedCache {
        &self.cache
    }

    pub fn fetcher(&self) -> &EntityFetcher {
        &self.fetcher
    }

    pub fn config(&self) -> &SyncConfig {
        self.fetcher.config()
    }

    /// Sync one entity class to a terminal state
    ///
    /// A fetch failure leaves the existing cache untouched.
    pub async fn sync_entity_class(&self, kind: EntityKind) -> SyncReport {
        let mut report = SyncReport::new(kind);

        report.enter(SyncState::Fetching);
        let (owners, links) = match self.fetcher.fetch_rows(kind).await {
            Ok(rows) => rows,
            Err(e) => return report.fail(e),
        };

        report.enter(SyncState::Normalizing);
        let snapshot = match self.fetcher.normalize(kind, owners, &links) {
            Ok(snapshot) => snapshot,
            Err(e) => return report.fail(e),
        };

        self.persist_snapshot(&snapshot, report)
    }

    /// Sync every entity class in turn
    pub async fn sync_all(&self) -> Vec<SyncReport> {
        let mut reports = Vec::with_capacity(EntityKind::ALL.len());
        for kind in EntityKind::ALL {
            reports.push(self.sync_entity_class(kind).await);
        }
        reports
    }

    /// Store an already-normalized snapshot, degrading on `QuotaExceeded`
    pub fn persist(&self, snapshot: &Snapshot) -> SyncReport {
        self.persist_snapshot(snapshot, SyncReport::new(snapshot.kind()))
    }

    fn persist_snapshot(&self, snapshot: &Snapshot, mut report: SyncReport) -> SyncReport {
        report.records = snapshot.records();
        report.enter(SyncState::Persisting);

        let json = match snapshot.to_json() {
            Ok(json) => json,
            Err(e) => return report.fail(storage_failure(e)),
        };

        match self.cache.set_str(snapshot.kind().canonical_key(), &json) {
            Ok(()) => {
                report.bytes = json.len();
                if let Some(profile) = snapshot.as_profile() {
                    mirror_profile(&self.cache, profile);
                }
                report.finish(SyncState::Done)
            }
            Err(e) if e.is_quota() => {
                tracing::warn!(kind = %snapshot.kind(), "Full snapshot does not fit: {}", e);
                degrade(&self.cache, snapshot, report)
            }
            Err(e) => report.fail(storage_failure(e)),
        }
    }
}
