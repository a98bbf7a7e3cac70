//! Typed accessors over a [`LocalCache`]
//!
//! Callers never handle raw key strings; every key goes through [`CacheKey`].

use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;

use super::keys::CacheKey;
use super::local::{CacheError, LocalCache};
use crate::model::{Connection, FamilyMember, Platform, Profile, StoryMilestone};

/// Typed view of the local cache
#[derive(Clone)]
pub struct TypedCache {
    inner: Arc<dyn LocalCache>,
}

impl TypedCache {
    pub fn new(inner: Arc<dyn LocalCache>) -> Self {
        Self { inner }
    }

    /// The underlying store
    pub fn backend(&self) -> &Arc<dyn LocalCache> {
        &self.inner
    }

    pub fn get_str(&self, key: CacheKey) -> Option<String> {
        self.inner.get(key.as_str())
    }

    pub fn set_str(&self, key: CacheKey, value: &str) -> Result<(), CacheError> {
        self.inner.set(key.as_str(), value)
    }

    pub fn contains(&self, key: CacheKey) -> bool {
        self.get_str(key).is_some()
    }

    pub fn remove(&self, key: CacheKey) {
        self.inner.remove(key.as_str());
    }

    /// Remove every key except `keep`, returning the well-known keys that were dropped
    pub fn clear_all_except(&self, keep: &[CacheKey]) -> Vec<CacheKey> {
        let dropped: Vec<CacheKey> = CacheKey::ALL
            .into_iter()
            .filter(|key| !keep.contains(key) && self.contains(*key))
            .collect();

        let keep: Vec<&str> = keep.iter().map(CacheKey::as_str).collect();
        self.inner.clear_all_except(&keep);
        dropped
    }

    /// Read and decode a JSON value; a corrupt value is removed and reported as absent
    pub fn get_json<T: DeserializeOwned>(&self, key: CacheKey) -> Option<T> {
        let raw = self.get_str(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key = %key, "Discarding unreadable cache entry: {}", e);
                self.remove(key);
                None
            }
        }
    }

    /// Encode and store a JSON value, returning the bytes written
    pub fn set_json<T: Serialize + ?Sized>(&self, key: CacheKey, value: &T) -> Result<usize, CacheError> {
        let json = encode(value)?;
        self.set_str(key, &json)?;
        Ok(json.len())
    }

    // === Entity snapshots ===

    pub fn get_profile(&self) -> Option<Profile> {
        self.get_json(CacheKey::PersonalProfile)
    }

    pub fn set_profile(&self, profile: &Profile) -> Result<usize, CacheError> {
        self.set_json(CacheKey::PersonalProfile, profile)
    }

    pub fn get_connections(&self) -> Option<Vec<Connection>> {
        self.get_json(CacheKey::Connections)
    }

    pub fn set_connections(&self, connections: &[Connection]) -> Result<usize, CacheError> {
        self.set_json(CacheKey::Connections, connections)
    }

    pub fn get_family_members(&self) -> Option<Vec<FamilyMember>> {
        self.get_json(CacheKey::FamilyMembers)
    }

    pub fn set_family_members(&self, members: &[FamilyMember]) -> Result<usize, CacheError> {
        self.set_json(CacheKey::FamilyMembers, members)
    }

    pub fn get_story_milestones(&self) -> Option<Vec<StoryMilestone>> {
        self.get_json(CacheKey::StoryMilestones)
    }

    pub fn set_story_milestones(&self, milestones: &[StoryMilestone]) -> Result<usize, CacheError> {
        self.set_json(CacheKey::StoryMilestones, milestones)
    }

    // === Standalone profile fields ===

    pub fn profile_image_url(&self) -> Option<String> {
        self.get_str(CacheKey::ProfileImageUrl)
    }

    pub fn set_profile_image_url(&self, url: &str) -> Result<(), CacheError> {
        self.set_str(CacheKey::ProfileImageUrl, url)
    }

    pub fn resume_url(&self) -> Option<String> {
        self.get_str(CacheKey::ResumeUrl)
    }

    pub fn set_resume_url(&self, url: &str) -> Result<(), CacheError> {
        self.set_str(CacheKey::ResumeUrl, url)
    }

    /// Mirrored profile URL for a platform; `None` for platforms without a mirror key
    pub fn social_url(&self, platform: &Platform) -> Option<String> {
        platform.mirror_key().and_then(|key| self.get_str(key))
    }
}

/// Encode a value as JSON, mapping failures to `CacheError::Serialization`
pub(crate) fn encode<T: Serialize + ?Sized>(value: &T) -> Result<String, CacheError> {
    serde_json::to_string(value).map_err(|e| CacheError::Serialization(e.to_string()))
}
