//! Read path: cache first, remote store on a miss, defaults last
//!
//! Never yields an empty name or a missing photo reference.

use serde::Serialize;

use crate::cache::{CacheKey, TypedCache};
use crate::config::SyncConfig;
use crate::model::{Connection, FamilyMember, Platform, Profile, SocialLinks, StoryMilestone};
use crate::sync::EntityFetcher;

/// Where a resolved value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Cache,
    Remote,
    Default,
}

/// A value plus its origin
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved<T> {
    pub value: T,
    pub source: Source,
}

impl<T> Resolved<T> {
    fn new(value: T, source: Source) -> Self {
        Self { value, source }
    }
}

/// Cache-first reader for rendering
#[derive(Clone)]
pub struct CacheReader {
    fetcher: EntityFetcher,
    cache: TypedCache,
}

impl CacheReader {
    pub fn new(fetcher: EntityFetcher, cache: TypedCache) -> Self {
        Self { fetcher, cache }
    }

    fn config(&self) -> &SyncConfig {
        self.fetcher.config()
    }

    /// Profile with photo and name always populated
    pub async fn profile(&self) -> Resolved<Profile> {
        if let Some(profile) = self.cache.get_profile() {
            return Resolved::new(self.with_defaults(profile), Source::Cache);
        }

        match self.fetcher.fetch_profile().await {
            Ok(profile) => {
                if let Err(e) = self.cache.set_profile(&profile) {
                    tracing::debug!("Profile not written back to cache: {}", e);
                }
                Resolved::new(self.with_defaults(profile), Source::Remote)
            }
            Err(e) => {
                tracing::warn!("Profile unavailable, rendering defaults: {}", e);
                Resolved::new(self.default_profile(), Source::Default)
            }
        }
    }

    /// Photo URL: standalone key, then cached profile, then remote, then the bundled default
    pub async fn profile_image_url(&self) -> Resolved<String> {
        if let Some(url) = non_blank(self.cache.profile_image_url()) {
            return Resolved::new(url, Source::Cache);
        }
        if let Some(url) = self.cache.get_profile().and_then(|p| non_blank(p.photo_url)) {
            return Resolved::new(url, Source::Cache);
        }

        match self.fetcher.fetch_profile().await {
            Ok(profile) => match non_blank(profile.photo_url) {
                Some(url) => Resolved::new(url, Source::Remote),
                None => Resolved::new(self.config().default_photo_url.clone(), Source::Default),
            },
            Err(e) => {
                tracing::warn!("Profile photo unavailable: {}", e);
                Resolved::new(self.config().default_photo_url.clone(), Source::Default)
            }
        }
    }

    /// Resume URL; `None` with `Source::Default` when nowhere to be found
    pub async fn resume_url(&self) -> Resolved<Option<String>> {
        if let Some(url) = non_blank(self.cache.resume_url()) {
            return Resolved::new(Some(url), Source::Cache);
        }
        if let Some(url) = self.cache.get_profile().and_then(|p| non_blank(p.resume_url)) {
            return Resolved::new(Some(url), Source::Cache);
        }

        match self.fetcher.fetch_profile().await {
            Ok(profile) => match non_blank(profile.resume_url) {
                Some(url) => Resolved::new(Some(url), Source::Remote),
                None => Resolved::new(None, Source::Default),
            },
            Err(e) => {
                tracing::warn!("Resume unavailable: {}", e);
                Resolved::new(None, Source::Default)
            }
        }
    }

    /// Profile URL for one platform
    pub async fn social_url(&self, platform: &Platform) -> Resolved<Option<String>> {
        if let Some(url) = non_blank(self.cache.social_url(platform)) {
            return Resolved::new(Some(url), Source::Cache);
        }
        if let Some(profile) = self.cache.get_profile() {
            if let Some(url) = profile.social_url(platform) {
                return Resolved::new(Some(url.to_string()), Source::Cache);
            }
        }

        match self.fetcher.fetch_profile().await {
            Ok(profile) => match profile.social_url(platform) {
                Some(url) => Resolved::new(Some(url.to_string()), Source::Remote),
                None => Resolved::new(None, Source::Default),
            },
            Err(e) => {
                tracing::warn!(platform = %platform, "Social link unavailable: {}", e);
                Resolved::new(None, Source::Default)
            }
        }
    }

    pub async fn connections(&self) -> Resolved<Vec<Connection>> {
        if let Some(items) = self.cache.get_connections() {
            return Resolved::new(items, Source::Cache);
        }

        match self.fetcher.fetch_connections().await {
            Ok(items) => {
                self.write_back(CacheKey::Connections, &items);
                Resolved::new(items, Source::Remote)
            }
            Err(e) => {
                tracing::warn!("Connections unavailable: {}", e);
                Resolved::new(Vec::new(), Source::Default)
            }
        }
    }

    /// Connections flagged special, in display order
    pub async fn thought_leaders(&self) -> Resolved<Vec<Connection>> {
        let Resolved { value, source } = self.connections().await;
        Resolved::new(value.into_iter().filter(|c| c.is_special).collect(), source)
    }

    pub async fn family_members(&self) -> Resolved<Vec<FamilyMember>> {
        if let Some(items) = self.cache.get_family_members() {
            return Resolved::new(items, Source::Cache);
        }

        match self.fetcher.fetch_family_members().await {
            Ok(items) => {
                self.write_back(CacheKey::FamilyMembers, &items);
                Resolved::new(items, Source::Remote)
            }
            Err(e) => {
                tracing::warn!("Family members unavailable: {}", e);
                Resolved::new(Vec::new(), Source::Default)
            }
        }
    }

    pub async fn story_milestones(&self) -> Resolved<Vec<StoryMilestone>> {
        if let Some(items) = self.cache.get_story_milestones() {
            return Resolved::new(items, Source::Cache);
        }

        match self.fetcher.fetch_story_milestones().await {
            Ok(items) => {
                self.write_back(CacheKey::StoryMilestones, &items);
                Resolved::new(items, Source::Remote)
            }
            Err(e) => {
                tracing::warn!("Story milestones unavailable: {}", e);
                Resolved::new(Vec::new(), Source::Default)
            }
        }
    }

    fn write_back<T: Serialize>(&self, key: CacheKey, items: &[T]) {
        if let Err(e) = self.cache.set_json(key, items) {
            tracing::debug!(key = %key, "Not written back to cache: {}", e);
        }
    }

    fn with_defaults(&self, mut profile: Profile) -> Profile {
        if profile.photo_url.as_deref().map_or(true, |url| url.trim().is_empty()) {
            profile.photo_url = Some(self.config().default_photo_url.clone());
        }
        if profile.name.trim().is_empty() {
            profile.name = self.config().default_display_name.clone();
        }
        profile
    }

    fn default_profile(&self) -> Profile {
        let config = self.config();
        Profile {
            id: config.owner_id.clone(),
            name: config.default_display_name.clone(),
            bio: None,
            photo_url: Some(config.default_photo_url.clone()),
            resume_url: None,
            created_at: None,
            updated_at: None,
            social_links: SocialLinks::new(),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
