//! Tool configuration
//!
//! Loaded from a TOML file with `[remote]`, `[cache]` and `[sync]` sections.
//! Every section is optional; CLI flags and environment variables override
//! individual values after loading.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use folio_sdk::{SyncConfig, TableNames, DEFAULT_PHOTO_URL, DEFAULT_QUOTA_BYTES};
use folio_store_client::StoreConfig;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub sync: SyncSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Base URL of the hosted backend
    #[serde(default = "default_url")]
    pub url: String,

    /// Public API key
    #[serde(default)]
    pub api_key: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Admin credentials, needed only for uploads
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            api_key: String::new(),
            timeout_secs: default_timeout(),
            email: None,
            password: None,
        }
    }
}

fn default_url() -> String {
    "http://localhost:54321".to_string()
}

fn default_timeout() -> u64 {
    30
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// JSON file backing the local cache
    #[serde(default = "default_cache_path")]
    pub path: PathBuf,

    /// Capacity in bytes
    #[serde(default = "default_quota")]
    pub quota_bytes: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            path: default_cache_path(),
            quota_bytes: default_quota(),
        }
    }
}

fn default_cache_path() -> PathBuf {
    PathBuf::from("folio-cache.json")
}

fn default_quota() -> usize {
    DEFAULT_QUOTA_BYTES
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncSection {
    /// Profile id whose data is synced
    #[serde(default)]
    pub owner_id: String,

    #[serde(default = "default_photo")]
    pub default_photo_url: String,

    #[serde(default)]
    pub default_display_name: Option<String>,

    #[serde(default)]
    pub tables: TableNames,
}

impl Default for SyncSection {
    fn default() -> Self {
        Self {
            owner_id: String::new(),
            default_photo_url: default_photo(),
            default_display_name: None,
            tables: TableNames::default(),
        }
    }
}

fn default_photo() -> String {
    DEFAULT_PHOTO_URL.to_string()
}

impl Config {
    /// Read `path`, or fall back to defaults when it does not exist
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            tracing::info!("Config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config = toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;
        Ok(config)
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            base_url: self.remote.url.trim_end_matches('/').to_string(),
            api_key: self.remote.api_key.clone(),
            timeout_secs: self.remote.timeout_secs,
        }
    }

    /// Validated SDK sync configuration
    pub fn sync_config(&self) -> anyhow::Result<SyncConfig> {
        let mut config = SyncConfig::new(self.sync.owner_id.trim())
            .with_default_photo(self.sync.default_photo_url.clone())
            .with_tables(self.sync.tables.clone());
        if let Some(name) = &self.sync.default_display_name {
            config = config.with_default_name(name.clone());
        }
        config.validate()?;
        Ok(config)
    }
}
