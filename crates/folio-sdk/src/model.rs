//! Entity records shown on the site
//!
//! Field names follow the table columns; the one display-only field,
//! `socialLinks`, is attached by the normalizer from the child link tables.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

use crate::cache::CacheKey;
use crate::config::TableNames;

/// Platform name → URL. Ordered so snapshots serialize identically every time.
pub type SocialLinks = BTreeMap<String, String>;

/// Social platforms with a dedicated mirror key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Platform {
    LinkedIn,
    Twitter,
    YouTube,
    Spotify,
    AnandCircle,
    Instagram,
    Facebook,
    /// Any platform name not listed above, lowercased
    Other(String),
}

impl Platform {
    /// Parse from the stored platform name (case-insensitive)
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "linkedin" => Self::LinkedIn,
            "twitter" | "x" => Self::Twitter,
            "youtube" => Self::YouTube,
            "spotify" => Self::Spotify,
            "anandcircle" => Self::AnandCircle,
            "instagram" => Self::Instagram,
            "facebook" => Self::Facebook,
            other => Self::Other(other.to_string()),
        }
    }

    /// Stored platform name
    pub fn as_str(&self) -> &str {
        match self {
            Self::LinkedIn => "linkedin",
            Self::Twitter => "twitter",
            Self::YouTube => "youtube",
            Self::Spotify => "spotify",
            Self::AnandCircle => "anandcircle",
            Self::Instagram => "instagram",
            Self::Facebook => "facebook",
            Self::Other(name) => name,
        }
    }

    /// Standalone cache key mirroring this platform's profile URL, if any
    pub fn mirror_key(&self) -> Option<CacheKey> {
        match self {
            Self::LinkedIn => Some(CacheKey::LinkedInUrl),
            Self::Twitter => Some(CacheKey::TwitterUrl),
            Self::YouTube => Some(CacheKey::YoutubeUrl),
            Self::Spotify => Some(CacheKey::SpotifyUrl),
            Self::AnandCircle => Some(CacheKey::AnandCircleUrl),
            _ => None,
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Connection grouping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Family,
    Politics,
    Business,
    Health,
    Learning,
    #[default]
    #[serde(other)]
    Other,
}

/// The site owner's profile (one per owner id)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default, alias = "image_url")]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub resume_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(rename = "socialLinks", default)]
    pub social_links: SocialLinks,
}

/// A followed or notable person
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(default)]
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
    #[serde(rename = "socialLinks", default)]
    pub social_links: SocialLinks,
}

/// Immediate family member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FamilyMember {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default, alias = "image_url")]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub position: i32,
    #[serde(rename = "socialLinks", default)]
    pub social_links: SocialLinks,
}

/// Career/story entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryMilestone {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(default, alias = "name")]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub position: i32,
}

/// Records that own a SocialLinkSet
pub trait SocialOwner {
    fn owner_id(&self) -> &str;
    fn attach_social_links(&mut self, links: SocialLinks);
}

macro_rules! social_owner {
    ($($ty:ty),*) => {$(
        impl SocialOwner for $ty {
            fn owner_id(&self) -> &str {
                &self.id
            }

            fn attach_social_links(&mut self, links: SocialLinks) {
                self.social_links = links;
            }
        }
    )*};
}

social_owner!(Profile, Connection, FamilyMember);

/// The fields that survive a partial (tier 1) persist
///
/// Decodes back into the full record types, which accept `image_url` and
/// `name` as aliases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Essentials {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_url: Option<String>,
}

impl Profile {
    pub fn essentials(&self) -> Essentials {
        Essentials {
            id: self.id.clone(),
            name: self.name.clone(),
            image_url: self.photo_url.clone(),
            resume_url: self.resume_url.clone(),
        }
    }

    /// URL for a platform in this profile's link set
    pub fn social_url(&self, platform: &Platform) -> Option<&str> {
        self.social_links.get(platform.as_str()).map(String::as_str)
    }
}

impl Connection {
    pub fn essentials(&self) -> Essentials {
        Essentials {
            id: self.id.clone(),
            name: self.name.clone(),
            image_url: self.image_url.clone(),
            resume_url: None,
        }
    }
}

impl FamilyMember {
    pub fn essentials(&self) -> Essentials {
        Essentials {
            id: self.id.clone(),
            name: self.name.clone(),
            image_url: self.photo_url.clone(),
            resume_url: None,
        }
    }
}

impl StoryMilestone {
    pub fn essentials(&self) -> Essentials {
        Essentials {
            id: self.id.clone(),
            name: self.title.clone(),
            image_url: None,
            resume_url: None,
        }
    }
}

/// Entity classes the orchestrator can sync
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Profile,
    Connections,
    FamilyMembers,
    StoryMilestones,
}

impl EntityKind {
    /// Sync order used by `sync_all`
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Profile,
        EntityKind::StoryMilestones,
        EntityKind::FamilyMembers,
        EntityKind::Connections,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Profile => "profile",
            Self::Connections => "connections",
            Self::FamilyMembers => "family_members",
            Self::StoryMilestones => "story_milestones",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().replace('-', "_").as_str() {
            "profile" => Some(Self::Profile),
            "connections" => Some(Self::Connections),
            "family_members" | "family" => Some(Self::FamilyMembers),
            "story_milestones" | "story" | "stories" => Some(Self::StoryMilestones),
            _ => None,
        }
    }

    /// Key the full snapshot is stored under
    pub fn canonical_key(&self) -> CacheKey {
        match self {
            Self::Profile => CacheKey::PersonalProfile,
            Self::Connections => CacheKey::Connections,
            Self::FamilyMembers => CacheKey::FamilyMembers,
            Self::StoryMilestones => CacheKey::StoryMilestones,
        }
    }

    pub fn owner_table<'a>(&self, tables: &'a TableNames) -> &'a str {
        match self {
            Self::Profile => &tables.profiles,
            Self::Connections => &tables.connections,
            Self::FamilyMembers => &tables.family_members,
            Self::StoryMilestones => &tables.story_milestones,
        }
    }

    /// Child link table and its foreign key column; `None` for classes without links
    pub fn link_table<'a>(&self, tables: &'a TableNames) -> Option<(&'a str, &'a str)> {
        match self {
            Self::Profile => Some((&tables.profile_links, &tables.profile_fk)),
            Self::Connections => Some((&tables.connection_links, &tables.connection_fk)),
            Self::FamilyMembers => Some((&tables.family_member_links, &tables.family_member_fk)),
            Self::StoryMilestones => None,
        }
    }

    /// Columns the store orders rows by
    pub fn order_columns(&self) -> &'static [&'static str] {
        match self {
            Self::Profile => &[],
            Self::Connections => &["category", "position", "name"],
            Self::FamilyMembers => &["position", "name"],
            Self::StoryMilestones => &["position"],
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Accept string or numeric ids; the store returns either depending on the column type.
fn id_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_platform_names_round_trip() {
        for name in ["linkedin", "twitter", "youtube", "spotify", "anandcircle", "instagram", "facebook"] {
            assert_eq!(Platform::from_name(name).as_str(), name);
        }
        assert_eq!(Platform::from_name("LinkedIn"), Platform::LinkedIn);
        assert_eq!(Platform::from_name("Mastodon"), Platform::Other("mastodon".into()));
    }

    #[test]
    fn test_mirror_keys() {
        assert_eq!(Platform::LinkedIn.mirror_key(), Some(CacheKey::LinkedInUrl));
        assert_eq!(Platform::AnandCircle.mirror_key(), Some(CacheKey::AnandCircleUrl));
        assert_eq!(Platform::Instagram.mirror_key(), None);
    }

    #[test]
    fn test_numeric_ids_become_strings() {
        let member: FamilyMember = serde_json::from_value(json!({
            "id": 7,
            "name": "Asha",
            "position": 2
        }))
        .unwrap();
        assert_eq!(member.id, "7");
        assert!(member.social_links.is_empty());
    }

    #[test]
    fn test_unknown_category_falls_back() {
        let conn: Connection = serde_json::from_value(json!({
            "id": "c1",
            "name": "B",
            "category": "sports"
        }))
        .unwrap();
        assert_eq!(conn.category, Category::Other);
    }

    #[test]
    fn test_profile_serializes_social_links_camel_case() {
        let profile = Profile {
            id: "p1".into(),
            name: "A".into(),
            bio: None,
            photo_url: None,
            resume_url: None,
            created_at: None,
            updated_at: None,
            social_links: SocialLinks::new(),
        };
        let value = serde_json::to_value(&profile).unwrap();
        assert_eq!(value["socialLinks"], json!({}));
    }

    #[test]
    fn test_essentials_skip_missing_urls() {
        let milestone = StoryMilestone {
            id: "s1".into(),
            title: "Started".into(),
            description: None,
            icon: None,
            position: 0,
        };
        let json = serde_json::to_string(&milestone.essentials()).unwrap();
        assert_eq!(json, r#"{"id":"s1","name":"Started"}"#);
    }

    #[test]
    fn test_reduced_records_decode_as_full_records() {
        let member: FamilyMember = serde_json::from_value(json!({
            "id": "f1",
            "name": "Asha",
            "image_url": "https://x/asha.png"
        }))
        .unwrap();
        assert_eq!(member.photo_url.as_deref(), Some("https://x/asha.png"));

        let milestone: StoryMilestone =
            serde_json::from_value(json!({"id": "s1", "name": "Started"})).unwrap();
        assert_eq!(milestone.title, "Started");
    }

    #[test]
    fn test_entity_kind_names() {
        for kind in EntityKind::ALL {
            assert_eq!(EntityKind::from_name(kind.as_str()), Some(kind));
        }
        assert_eq!(EntityKind::from_name("family"), Some(EntityKind::FamilyMembers));
        assert_eq!(EntityKind::from_name("gallery"), None);
    }
}
