//! Folio SDK - cached profile data for the folio site
//!
//! Keeps a quota-bounded local copy of the site owner's profile, connections,
//! family members and story milestones so pages render without waiting on
//! the hosted backend.
//!
//! # Architecture
//!
//! - **Remote store**: hosted tables + blob storage behind [`RemoteStore`]
//! - **Local cache**: string key/value store with a byte quota ([`LocalCache`])
//! - **Sync**: fetch → normalize → persist, degrading when the quota is hit
//! - **Read path**: cache first, then the store, then built-in defaults
//!
//! # Example
//!
//! ```rust,ignore
//! use folio_sdk::{CacheReader, EntityKind, MemoryCache, SyncConfig, SyncOrchestrator};
//!
//! let orchestrator = SyncOrchestrator::new(
//!     Arc::new(store_client),
//!     Arc::new(MemoryCache::default()),
//!     SyncConfig::new("owner-1"),
//! );
//!
//! for report in orchestrator.sync_all().await {
//!     println!("{}", report.notification());
//! }
//!
//! let reader = CacheReader::new(orchestrator.fetcher().clone(), orchestrator.cache().clone());
//! let photo = reader.profile_image_url().await;
//! ```

// Remote store contract
pub mod traits;

// RemoteStore over the HTTP client
#[cfg(feature = "client")]
pub mod client;

// Local cache backends and typed keys
pub mod cache;

// Entity records
pub mod model;

// Owner + link row joining
pub mod normalize;

// Sync orchestration and degradation
pub mod sync;

// Cache-first reads
pub mod read;

// Admin writes
pub mod admin;

pub mod config;

// Error types
pub mod error;

// Re-export core traits
pub use traits::{RemoteStore, Row, RowQuery};

// Re-export cache types
pub use cache::{CacheError, CacheKey, FileCache, LocalCache, MemoryCache, TypedCache, DEFAULT_QUOTA_BYTES};

// Re-export model types
pub use model::{
    Category, Connection, EntityKind, Essentials, FamilyMember, Platform, Profile, SocialLinks,
    StoryMilestone,
};

// Re-export sync types
pub use sync::{
    EntityFetcher, Notification, NotificationLevel, Snapshot, SyncOrchestrator, SyncReport, SyncState,
};

pub use read::{CacheReader, Resolved, Source};

pub use admin::{
    ConnectionInput, FamilyMemberInput, LinkOwner, ProfileAdmin, ProfileInput, StoryMilestoneInput,
};

pub use config::{SyncConfig, TableNames, DEFAULT_PHOTO_URL};

// Re-export error types
pub use error::{RemoteError, Result, SdkError, SyncError};

// Re-export from the underlying client
#[cfg(feature = "client")]
pub use folio_store_client::{StoreClient, StoreConfig};
