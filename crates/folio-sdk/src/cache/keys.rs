//! Well-known local cache keys
//!
//! The string forms are read by the site's pages and must not change.

use std::fmt;

/// Every key the SDK reads or writes in the local cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CacheKey {
    /// Profile snapshot (JSON object)
    PersonalProfile,
    ProfileImageUrl,
    ResumeUrl,
    LinkedInUrl,
    TwitterUrl,
    YoutubeUrl,
    SpotifyUrl,
    AnandCircleUrl,
    /// Connection snapshot (JSON array)
    Connections,
    /// Family member snapshot (JSON array)
    FamilyMembers,
    /// Legacy special-connection snapshots, only ever cleared
    ThoughtLeaders,
    ThoughtLeaderConnections,
    /// Story milestone snapshot (JSON array)
    StoryMilestones,
}

impl CacheKey {
    pub const ALL: [CacheKey; 13] = [
        CacheKey::PersonalProfile,
        CacheKey::ProfileImageUrl,
        CacheKey::ResumeUrl,
        CacheKey::LinkedInUrl,
        CacheKey::TwitterUrl,
        CacheKey::YoutubeUrl,
        CacheKey::SpotifyUrl,
        CacheKey::AnandCircleUrl,
        CacheKey::Connections,
        CacheKey::FamilyMembers,
        CacheKey::ThoughtLeaders,
        CacheKey::ThoughtLeaderConnections,
        CacheKey::StoryMilestones,
    ];

    /// Keys that survive a minimal (tier 2) persist
    pub const CRITICAL: [CacheKey; 2] = [CacheKey::ProfileImageUrl, CacheKey::ResumeUrl];

    /// Large snapshot keys; tier 1 frees every one not owned by the syncing class
    pub const SNAPSHOTS: [CacheKey; 6] = [
        CacheKey::PersonalProfile,
        CacheKey::Connections,
        CacheKey::FamilyMembers,
        CacheKey::ThoughtLeaders,
        CacheKey::ThoughtLeaderConnections,
        CacheKey::StoryMilestones,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PersonalProfile => "personalProfile",
            Self::ProfileImageUrl => "profileImageUrl",
            Self::ResumeUrl => "resumeUrl",
            Self::LinkedInUrl => "linkedInUrl",
            Self::TwitterUrl => "twitterUrl",
            Self::YoutubeUrl => "youtubeUrl",
            Self::SpotifyUrl => "spotifyUrl",
            Self::AnandCircleUrl => "anandCircleUrl",
            Self::Connections => "connections",
            Self::FamilyMembers => "familyMembers",
            Self::ThoughtLeaders => "thoughtLeaders",
            Self::ThoughtLeaderConnections => "thoughtLeaderConnections",
            Self::StoryMilestones => "storyMilestones",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_str() == s)
    }

    pub fn is_critical(&self) -> bool {
        Self::CRITICAL.contains(self)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
