//! Standalone copies of the profile's photo, resume and social URLs
//!
//! The read path checks these keys before the profile blob, so a mirror that
//! cannot be refreshed is removed rather than left holding an older value.

use crate::cache::{CacheKey, TypedCache};
use crate::model::{Platform, Profile};

/// Platforms mirrored to standalone keys
const MIRRORED_PLATFORMS: [Platform; 5] = [
    Platform::LinkedIn,
    Platform::Twitter,
    Platform::YouTube,
    Platform::Spotify,
    Platform::AnandCircle,
];

/// Best-effort rewrite of every mirror key from `profile`
///
/// Returns the keys that hold the new value afterwards.
pub(crate) fn mirror_profile(cache: &TypedCache, profile: &Profile) -> Vec<CacheKey> {
    let mut fields: Vec<(CacheKey, Option<&str>)> = vec![
        (CacheKey::ProfileImageUrl, profile.photo_url.as_deref()),
        (CacheKey::ResumeUrl, profile.resume_url.as_deref()),
    ];
    for platform in &MIRRORED_PLATFORMS {
        if let Some(key) = platform.mirror_key() {
            fields.push((key, profile.social_url(platform)));
        }
    }

    let mut written = Vec::new();
    for (key, value) in fields {
        match value.filter(|v| !v.trim().is_empty()) {
            Some(url) => match cache.set_str(key, url) {
                Ok(()) => written.push(key),
                Err(e) => {
                    tracing::warn!("Could not mirror {}, removing stale copy: {}", key, e);
                    cache.remove(key);
                }
            },
            None => cache.remove(key),
        }
    }
    written
}
