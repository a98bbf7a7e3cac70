//! Sync configuration

use serde::{Deserialize, Serialize};

use crate::error::{Result, SdkError};

/// Photo shown when neither the cache nor the store has one
pub const DEFAULT_PHOTO_URL: &str = "/images/default-profile.png";

/// Configuration shared by the orchestrator, read path and admin surface
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Id of the profile row this site renders
    pub owner_id: String,

    /// Bundled fallback photo
    #[serde(default = "default_photo_url")]
    pub default_photo_url: String,

    /// Name rendered when no profile is reachable
    #[serde(default = "default_display_name")]
    pub default_display_name: String,

    /// Table and column names in the remote store
    #[serde(default)]
    pub tables: TableNames,
}

fn default_photo_url() -> String {
    DEFAULT_PHOTO_URL.to_string()
}

fn default_display_name() -> String {
    "Profile".to_string()
}

impl SyncConfig {
    pub fn new(owner_id: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            default_photo_url: default_photo_url(),
            default_display_name: default_display_name(),
            tables: TableNames::default(),
        }
    }

    pub fn with_default_photo(mut self, url: impl Into<String>) -> Self {
        self.default_photo_url = url.into();
        self
    }

    pub fn with_default_name(mut self, name: impl Into<String>) -> Self {
        self.default_display_name = name.into();
        self
    }

    pub fn with_tables(mut self, tables: TableNames) -> Self {
        self.tables = tables;
        self
    }

    /// Reject configurations that would make every sync fail
    pub fn validate(&self) -> Result<()> {
        if self.owner_id.trim().is_empty() {
            return Err(SdkError::Config("owner_id must not be empty".into()));
        }
        if self.default_photo_url.trim().is_empty() {
            return Err(SdkError::Config("default_photo_url must not be empty".into()));
        }
        Ok(())
    }
}

/// Remote table names and foreign key columns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableNames {
    pub profiles: String,
    pub profile_links: String,
    pub profile_fk: String,
    pub connections: String,
    pub connection_links: String,
    pub connection_fk: String,
    pub family_members: String,
    pub family_member_links: String,
    pub family_member_fk: String,
    pub story_milestones: String,
}

impl Default for TableNames {
    fn default() -> Self {
        Self {
            profiles: "profiles".into(),
            profile_links: "social_links".into(),
            profile_fk: "profile_id".into(),
            connections: "connections".into(),
            connection_links: "connection_social_links".into(),
            connection_fk: "connection_id".into(),
            family_members: "family_members".into(),
            family_member_links: "family_member_social_links".into(),
            family_member_fk: "family_member_id".into(),
            story_milestones: "story_milestones".into(),
        }
    }
}
