//! Fetching and normalizing one entity class

use std::sync::Arc;

use crate::cache::{encode, CacheError};
use crate::config::SyncConfig;
use crate::error::SyncError;
use crate::model::{Connection, EntityKind, Essentials, FamilyMember, Profile, StoryMilestone};
use crate::normalize::{decode_rows, normalize};
use crate::traits::{RemoteStore, Row, RowQuery};

/// Display-ready records of one entity class
#[derive(Debug, Clone, PartialEq)]
pub enum Snapshot {
    Profile(Profile),
    Connections(Vec<Connection>),
    FamilyMembers(Vec<FamilyMember>),
    StoryMilestones(Vec<StoryMilestone>),
}

impl Snapshot {
    pub fn kind(&self) -> EntityKind {
        match self {
            Snapshot::Profile(_) => EntityKind::Profile,
            Snapshot::Connections(_) => EntityKind::Connections,
            Snapshot::FamilyMembers(_) => EntityKind::FamilyMembers,
            Snapshot::StoryMilestones(_) => EntityKind::StoryMilestones,
        }
    }

    pub fn records(&self) -> usize {
        match self {
            Snapshot::Profile(_) => 1,
            Snapshot::Connections(items) => items.len(),
            Snapshot::FamilyMembers(items) => items.len(),
            Snapshot::StoryMilestones(items) => items.len(),
        }
    }

    pub fn as_profile(&self) -> Option<&Profile> {
        match self {
            Snapshot::Profile(profile) => Some(profile),
            _ => None,
        }
    }

    /// Full snapshot JSON
    pub fn to_json(&self) -> Result<String, CacheError> {
        match self {
            Snapshot::Profile(profile) => encode(profile),
            Snapshot::Connections(items) => encode(items),
            Snapshot::FamilyMembers(items) => encode(items),
            Snapshot::StoryMilestones(items) => encode(items),
        }
    }

    /// Reduced JSON: id, name, image and resume references only
    pub fn to_reduced_json(&self) -> Result<String, CacheError> {
        match self {
            Snapshot::Profile(profile) => encode(&profile.essentials()),
            Snapshot::Connections(items) => encode_essentials(items.iter().map(Connection::essentials)),
            Snapshot::FamilyMembers(items) => encode_essentials(items.iter().map(FamilyMember::essentials)),
            Snapshot::StoryMilestones(items) => {
                encode_essentials(items.iter().map(StoryMilestone::essentials))
            }
        }
    }
}

fn encode_essentials(items: impl Iterator<Item = Essentials>) -> Result<String, CacheError> {
    encode(&items.collect::<Vec<_>>())
}

/// Pulls owner and child link rows for an entity class and joins them
#[derive(Clone)]
pub struct EntityFetcher {
    remote: Arc<dyn RemoteStore>,
    config: SyncConfig,
}

impl EntityFetcher {
    pub fn new(remote: Arc<dyn RemoteStore>, config: SyncConfig) -> Self {
        Self { remote, config }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn remote(&self) -> &Arc<dyn RemoteStore> {
        &self.remote
    }

    /// Fetch (owner rows, child link rows) for `kind`; any remote error aborts
    pub async fn fetch_rows(&self, kind: EntityKind) -> Result<(Vec<Row>, Vec<Row>), SyncError> {
        let tables = &self.config.tables;

        let mut query = RowQuery::new();
        if kind == EntityKind::Profile {
            query = query.filter_eq("id", self.config.owner_id.as_str());
        }
        for column in kind.order_columns() {
            query = query.order_by(*column);
        }

        let owners = self.remote.fetch_rows(kind.owner_table(tables), &query).await?;

        let links = match kind.link_table(tables) {
            Some((table, foreign_key)) => {
                let mut link_query = RowQuery::new();
                if kind == EntityKind::Profile {
                    link_query = link_query.filter_eq(foreign_key, self.config.owner_id.as_str());
                }
                self.remote.fetch_rows(table, &link_query).await?
            }
            None => Vec::new(),
        };

        tracing::debug!(kind = %kind, owners = owners.len(), links = links.len(), "Fetched rows");
        Ok((owners, links))
    }

    /// Fetch and normalize `kind` into a snapshot
    pub async fn fetch(&self, kind: EntityKind) -> Result<Snapshot, SyncError> {
        let (owners, links) = self.fetch_rows(kind).await?;
        self.normalize(kind, owners, &links)
    }

    /// Join already-fetched rows into a snapshot
    pub fn normalize(&self, kind: EntityKind, owners: Vec<Row>, links: &[Row]) -> Result<Snapshot, SyncError> {
        let foreign_key = kind
            .link_table(&self.config.tables)
            .map(|(_, fk)| fk)
            .unwrap_or_default();

        match kind {
            EntityKind::Profile => {
                let profile = normalize(decode_rows::<Profile>(owners)?, links, foreign_key)
                    .into_iter()
                    .find(|p| p.id == self.config.owner_id)
                    .ok_or_else(|| SyncError::ProfileNotFound(self.config.owner_id.clone()))?;
                Ok(Snapshot::Profile(profile))
            }
            EntityKind::Connections => Ok(Snapshot::Connections(normalize(
                decode_rows(owners)?,
                links,
                foreign_key,
            ))),
            EntityKind::FamilyMembers => Ok(Snapshot::FamilyMembers(normalize(
                decode_rows(owners)?,
                links,
                foreign_key,
            ))),
            EntityKind::StoryMilestones => Ok(Snapshot::StoryMilestones(decode_rows(owners)?)),
        }
    }

    pub async fn fetch_profile(&self) -> Result<Profile, SyncError> {
        match self.fetch(EntityKind::Profile).await? {
            Snapshot::Profile(profile) => Ok(profile),
            other => Err(unexpected(EntityKind::Profile, &other)),
        }
    }

    pub async fn fetch_connections(&self) -> Result<Vec<Connection>, SyncError> {
        match self.fetch(EntityKind::Connections).await? {
            Snapshot::Connections(items) => Ok(items),
            other => Err(unexpected(EntityKind::Connections, &other)),
        }
    }

    pub async fn fetch_family_members(&self) -> Result<Vec<FamilyMember>, SyncError> {
        match self.fetch(EntityKind::FamilyMembers).await? {
            Snapshot::FamilyMembers(items) => Ok(items),
            other => Err(unexpected(EntityKind::FamilyMembers, &other)),
        }
    }

    pub async fn fetch_story_milestones(&self) -> Result<Vec<StoryMilestone>, SyncError> {
        match self.fetch(EntityKind::StoryMilestones).await? {
            Snapshot::StoryMilestones(items) => Ok(items),
            other => Err(unexpected(EntityKind::StoryMilestones, &other)),
        }
    }
}

fn unexpected(expected: EntityKind, got: &Snapshot) -> SyncError {
    SyncError::Decode(format!("expected {} snapshot, got {}", expected, got.kind()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SocialLinks;

    fn profile() -> Profile {
        let mut links = SocialLinks::new();
        links.insert("linkedin".into(), "https://li/a".into());
        Profile {
            id: "p1".into(),
            name: "A".into(),
            bio: Some("bio".into()),
            photo_url: Some("https://x/img.png".into()),
            resume_url: Some("https://x/cv.pdf".into()),
            created_at: None,
            updated_at: None,
            social_links: links,
        }
    }

    #[test]
    fn test_reduced_profile_keeps_only_essentials() {
        let reduced = Snapshot::Profile(profile()).to_reduced_json().unwrap();
        assert_eq!(
            reduced,
            r#"{"id":"p1","name":"A","image_url":"https://x/img.png","resume_url":"https://x/cv.pdf"}"#
        );
    }

    #[test]
    fn test_reduced_is_smaller_than_full() {
        let snapshot = Snapshot::Profile(profile());
        assert!(snapshot.to_reduced_json().unwrap().len() < snapshot.to_json().unwrap().len());
    }

    #[test]
    fn test_records_and_kind() {
        let snapshot = Snapshot::StoryMilestones(vec![]);
        assert_eq!(snapshot.records(), 0);
        assert_eq!(snapshot.kind(), EntityKind::StoryMilestones);
        assert!(snapshot.as_profile().is_none());
    }
}
