//! Degradation policy for a full local cache
//!
//! Entered only after the full snapshot write fails with `QuotaExceeded`.
//! Tiers run in order and stop at the first write that succeeds:
//!
//! 1. Partial: remove the snapshot keys of *other* entity classes, then store
//!    a reduced snapshot (id, name, image, resume) under the canonical key.
//!    A profile also refreshes its photo, resume and link mirror keys.
//! 2. Minimal: clear every key except `profileImageUrl` and `resumeUrl`, then
//!    write those two individually (plus `linkedInUrl`, best-effort). Classes
//!    other than Profile retry the reduced snapshot in the emptied cache.
//!
//! A non-quota failure at any tier ends the run in `Failed` immediately.
//!
//! Clearing other classes' snapshots is a deliberate cross-class side effect:
//! syncing the profile can evict cached connections and family members.

use super::fetch::Snapshot;
use super::mirror::mirror_profile;
use super::report::{SyncReport, SyncState};
use crate::cache::{CacheError, CacheKey, TypedCache};
use crate::error::SyncError;
use crate::model::{Platform, Profile};

/// Run the tiers for `snapshot`; `report` must be in `Persisting`
pub(crate) fn degrade(cache: &TypedCache, snapshot: &Snapshot, mut report: SyncReport) -> SyncReport {
    report.enter(SyncState::Degrading);
    let canonical = snapshot.kind().canonical_key();

    // Tier 1
    for key in CacheKey::SNAPSHOTS {
        if key != canonical && cache.contains(key) {
            cache.remove(key);
            push_unique(&mut report.dropped, key);
        }
    }

    let reduced = match snapshot.to_reduced_json() {
        Ok(json) => json,
        Err(e) => return report.fail(storage_failure(e)),
    };

    match cache.set_str(canonical, &reduced) {
        Ok(()) => {
            report.bytes = reduced.len();
            // The reduced blob carries no links, so the mirrors are the only copy
            if let Some(profile) = snapshot.as_profile() {
                mirror_profile(cache, profile);
            }
            return report.finish(SyncState::DonePartial);
        }
        Err(e) if e.is_quota() => {
            tracing::warn!(kind = %snapshot.kind(), "Reduced snapshot does not fit: {}", e);
        }
        Err(e) => return report.fail(SyncError::Storage(e)),
    }

    // Tier 2
    for key in cache.clear_all_except(&CacheKey::CRITICAL) {
        push_unique(&mut report.dropped, key);
    }

    match snapshot {
        Snapshot::Profile(profile) => store_critical(cache, profile, report),
        _ => match cache.set_str(canonical, &reduced) {
            Ok(()) => {
                report.bytes = reduced.len();
                report.retained.push(canonical);
                report.finish(SyncState::DoneMinimal)
            }
            Err(e) => report.fail(SyncError::Storage(e)),
        },
    }
}

/// Write the profile's critical fields as standalone keys
fn store_critical(cache: &TypedCache, profile: &Profile, mut report: SyncReport) -> SyncReport {
    let critical = [
        (CacheKey::ProfileImageUrl, profile.photo_url.as_deref()),
        (CacheKey::ResumeUrl, profile.resume_url.as_deref()),
    ];

    for (key, value) in critical {
        match value.filter(|v| !v.trim().is_empty()) {
            Some(url) => match cache.set_str(key, url) {
                Ok(()) => report.retained.push(key),
                Err(e) => {
                    // clear_all_except kept the previous value
                    cache.remove(key);
                    return report.fail(SyncError::Storage(e));
                }
            },
            None => cache.remove(key),
        }
    }

    if let Some(url) = profile.social_url(&Platform::LinkedIn) {
        match cache.set_str(CacheKey::LinkedInUrl, url) {
            Ok(()) => report.retained.push(CacheKey::LinkedInUrl),
            Err(e) => tracing::warn!("Skipping {}: {}", CacheKey::LinkedInUrl, e),
        }
    }

    report.finish(SyncState::DoneMinimal)
}

/// Encoding failures become `Serialization`; anything else is a storage failure
pub(crate) fn storage_failure(error: CacheError) -> SyncError {
    match error {
        CacheError::Serialization(message) => SyncError::Serialization(message),
        other => SyncError::Storage(other),
    }
}

fn push_unique(keys: &mut Vec<CacheKey>, key: CacheKey) {
    if !keys.contains(&key) {
        keys.push(key);
    }
}
