//! Admin writes: edit records in the remote store, then re-sync the cache
//!
//! Every mutation is a single pass with no retries. The re-sync runs only after
//! all writes succeeded, and its outcome comes back as a [`SyncReport`] so the
//! caller can show the matching notification.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::config::{SyncConfig, TableNames};
use crate::error::{Result, SdkError};
use crate::model::{Category, EntityKind, Platform, SocialLinks};
use crate::sync::{SyncOrchestrator, SyncReport};
use crate::traits::{RemoteStore, Row, RowQuery};

/// Profile fields an admin can edit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileInput {
    pub name: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub resume_url: Option<String>,
    #[serde(default)]
    pub social_links: SocialLinks,
}

/// New or edited connection; `id: None` creates one
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConnectionInput {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub is_special: bool,
    #[serde(default)]
    pub position: i32,
    #[serde(default)]
    pub social_links: SocialLinks,
}

/// New or edited family member; `id: None` creates one
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FamilyMemberInput {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub position: i32,
    #[serde(default)]
    pub social_links: SocialLinks,
}

/// New or edited story milestone; `id: None` creates one
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoryMilestoneInput {
    #[serde(default)]
    pub id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub position: i32,
}

/// Record types that own a social link set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOwner {
    Profile,
    Connection,
    FamilyMember,
}

impl LinkOwner {
    /// (link table, foreign key column)
    pub fn link_table<'a>(&self, tables: &'a TableNames) -> (&'a str, &'a str) {
        match self {
            LinkOwner::Profile => (&tables.profile_links, &tables.profile_fk),
            LinkOwner::Connection => (&tables.connection_links, &tables.connection_fk),
            LinkOwner::FamilyMember => (&tables.family_member_links, &tables.family_member_fk),
        }
    }
}

/// Write surface for the site's admin screens
#[derive(Clone)]
pub struct ProfileAdmin {
    orchestrator: SyncOrchestrator,
}

impl ProfileAdmin {
    pub fn new(orchestrator: SyncOrchestrator) -> Self {
        Self { orchestrator }
    }

    pub fn orchestrator(&self) -> &SyncOrchestrator {
        &self.orchestrator
    }

    fn remote(&self) -> &Arc<dyn RemoteStore> {
        self.orchestrator.fetcher().remote()
    }

    fn config(&self) -> &SyncConfig {
        self.orchestrator.config()
    }

    /// Upsert the owner's profile row and its links, then re-sync Profile
    pub async fn save_profile(&self, input: ProfileInput) -> Result<SyncReport> {
        require("name", &input.name)?;
        let owner_id = self.config().owner_id.clone();

        let row = into_row(json!({
            "id": owner_id,
            "name": input.name.trim(),
            "bio": input.bio,
            "photo_url": blank_to_none(input.photo_url),
            "resume_url": blank_to_none(input.resume_url),
            "updated_at": Utc::now(),
        }));
        self.remote()
            .upsert_rows(&self.config().tables.profiles, vec![row])
            .await?;

        self.replace_social_links(LinkOwner::Profile, &owner_id, &input.social_links)
            .await?;

        tracing::info!(owner = %owner_id, "Profile saved");
        Ok(self.resync(EntityKind::Profile).await)
    }

    /// Replace every link of one owner: delete all, then insert the non-blank ones
    pub async fn replace_social_links(
        &self,
        owner: LinkOwner,
        owner_id: &str,
        links: &SocialLinks,
    ) -> Result<()> {
        let (table, foreign_key) = owner.link_table(&self.config().tables);

        let rows: Vec<Row> = links
            .iter()
            .filter(|(_, url)| !url.trim().is_empty())
            .map(|(platform, url)| {
                into_row(json!({
                    foreign_key: owner_id,
                    "platform": Platform::from_name(platform).as_str(),
                    "url": url.trim(),
                }))
            })
            .collect();

        tracing::debug!(table, owner = owner_id, links = rows.len(), "Replacing social links");
        self.remote()
            .replace_children(table, foreign_key, owner_id, rows)
            .await?;
        Ok(())
    }

    /// Create or update a connection and its links, then re-sync Connections
    pub async fn save_connection(&self, input: ConnectionInput) -> Result<SyncReport> {
        require("name", &input.name)?;
        let id = input.id.clone().unwrap_or_else(new_id);

        let row = into_row(json!({
            "id": id,
            "name": input.name.trim(),
            "role": input.role,
            "category": input.category,
            "bio": input.bio,
            "image_url": blank_to_none(input.image_url),
            "is_special": input.is_special,
            "position": input.position,
        }));
        self.remote()
            .upsert_rows(&self.config().tables.connections, vec![row])
            .await?;
        self.replace_social_links(LinkOwner::Connection, &id, &input.social_links)
            .await?;

        Ok(self.resync(EntityKind::Connections).await)
    }

    /// Delete a connection (links first), then re-sync Connections
    pub async fn delete_connection(&self, id: &str) -> Result<SyncReport> {
        self.delete_owner(LinkOwner::Connection, &self.config().tables.connections, id)
            .await?;
        Ok(self.resync(EntityKind::Connections).await)
    }

    pub async fn save_family_member(&self, input: FamilyMemberInput) -> Result<SyncReport> {
        require("name", &input.name)?;
        let id = input.id.clone().unwrap_or_else(new_id);

        let row = into_row(json!({
            "id": id,
            "name": input.name.trim(),
            "role": input.role,
            "bio": input.bio,
            "photo_url": blank_to_none(input.photo_url),
            "position": input.position,
        }));
        self.remote()
            .upsert_rows(&self.config().tables.family_members, vec![row])
            .await?;
        self.replace_social_links(LinkOwner::FamilyMember, &id, &input.social_links)
            .await?;

        Ok(self.resync(EntityKind::FamilyMembers).await)
    }

    pub async fn delete_family_member(&self, id: &str) -> Result<SyncReport> {
        self.delete_owner(LinkOwner::FamilyMember, &self.config().tables.family_members, id)
            .await?;
        Ok(self.resync(EntityKind::FamilyMembers).await)
    }

    pub async fn save_story_milestone(&self, input: StoryMilestoneInput) -> Result<SyncReport> {
        require("title", &input.title)?;
        let id = input.id.clone().unwrap_or_else(new_id);

        let row = into_row(json!({
            "id": id,
            "title": input.title.trim(),
            "description": input.description,
            "icon": input.icon,
            "position": input.position,
        }));
        self.remote()
            .upsert_rows(&self.config().tables.story_milestones, vec![row])
            .await?;

        Ok(self.resync(EntityKind::StoryMilestones).await)
    }

    pub async fn delete_story_milestone(&self, id: &str) -> Result<SyncReport> {
        require("id", id)?;
        self.remote()
            .delete_rows(
                &self.config().tables.story_milestones,
                &RowQuery::new().filter_eq("id", id),
            )
            .await?;
        Ok(self.resync(EntityKind::StoryMilestones).await)
    }

    /// Upload a profile photo and return its public URL
    pub async fn upload_photo(
        &self,
        bucket: &str,
        file_name: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<String> {
        if !content_type.starts_with("image/") {
            return Err(SdkError::Validation(format!(
                "photo must be an image, got {}",
                content_type
            )));
        }
        self.upload(bucket, file_name, data, content_type).await
    }

    /// Upload a resume PDF and return its public URL
    pub async fn upload_resume(
        &self,
        bucket: &str,
        file_name: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<String> {
        if content_type != "application/pdf" {
            return Err(SdkError::Validation(format!(
                "resume must be a PDF, got {}",
                content_type
            )));
        }
        self.upload(bucket, file_name, data, content_type).await
    }

    async fn upload(
        &self,
        bucket: &str,
        file_name: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<String> {
        require("file name", file_name)?;
        if data.is_empty() {
            return Err(SdkError::Validation("file is empty".into()));
        }

        let path = object_path(&self.config().owner_id, file_name, Utc::now().timestamp_millis());
        let size = data.len();
        let url = self
            .remote()
            .upload_blob(bucket, &path, data, content_type)
            .await?;

        tracing::info!(bucket, path = %path, size, "Uploaded file");
        Ok(url)
    }

    async fn delete_owner(&self, owner: LinkOwner, table: &str, id: &str) -> Result<()> {
        require("id", id)?;
        let (link_table, foreign_key) = owner.link_table(&self.config().tables);

        self.remote()
            .delete_rows(link_table, &RowQuery::new().filter_eq(foreign_key, id))
            .await?;
        self.remote()
            .delete_rows(table, &RowQuery::new().filter_eq("id", id))
            .await?;
        Ok(())
    }

    async fn resync(&self, kind: EntityKind) -> SyncReport {
        self.orchestrator.sync_entity_class(kind).await
    }
}

/// `{owner}/{millis}-{name}` with whitespace in the name collapsed to `-`
fn object_path(owner_id: &str, file_name: &str, millis: i64) -> String {
    let name: Vec<&str> = file_name.split_whitespace().collect();
    format!("{}/{}-{}", owner_id, millis, name.join("-"))
}

fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(SdkError::Validation(format!("{} must not be empty", field)));
    }
    Ok(())
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn into_row(value: Value) -> Row {
    match value {
        Value::Object(map) => map,
        _ => Row::new(),
    }
}
