//! folio-sync: keep a local cache of the folio site's profile data
//!
//! Pulls the profile, story milestones, family members and connections from
//! the hosted backend into a file-backed, quota-bounded cache and prints the
//! outcome of each sync as a success, degraded or failure notification.

mod config;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::Config;
use folio_sdk::{
    CacheKey, CacheReader, EntityKind, FileCache, LocalCache, NotificationLevel, ProfileAdmin,
    SyncOrchestrator,
};
use folio_store_client::StoreClient;

#[derive(Parser)]
#[command(name = "folio-sync")]
#[command(about = "Sync the folio site's profile data into a local cache")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, env = "FOLIO_CONFIG", default_value = "folio.toml")]
    config: PathBuf,

    /// Backend base URL (overrides config file)
    #[arg(long, env = "FOLIO_REMOTE_URL")]
    remote_url: Option<String>,

    /// Public API key (overrides config file)
    #[arg(long, env = "FOLIO_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Profile id to sync (overrides config file)
    #[arg(long, env = "FOLIO_OWNER_ID")]
    owner_id: Option<String>,

    /// Cache file (overrides config file)
    #[arg(long, env = "FOLIO_CACHE_PATH")]
    cache_path: Option<PathBuf>,

    /// Log level for folio crates; RUST_LOG wins when unset
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sync entity classes (all of them when none are named)
    Sync {
        /// profile, story_milestones, family_members, connections
        kinds: Vec<String>,
    },
    /// Print one cached value
    Show {
        /// Cache key, e.g. personalProfile or profileImageUrl
        key: String,
    },
    /// List cached keys and quota usage
    Status,
    /// Remove cached entries
    Clear {
        /// Keep profileImageUrl and resumeUrl
        #[arg(long)]
        keep_critical: bool,
    },
    /// Print the profile as the site would render it
    Profile,
    /// Upload a profile photo or resume and print its public URL
    Upload {
        #[arg(value_enum)]
        kind: UploadKind,
        file: PathBuf,
        /// Storage bucket
        #[arg(long)]
        bucket: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum UploadKind {
    Photo,
    Resume,
}

impl UploadKind {
    fn default_bucket(&self) -> &'static str {
        match self {
            UploadKind::Photo => "profile-images",
            UploadKind::Resume => "resumes",
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match &cli.log_level {
        Some(level) => EnvFilter::new(format!("folio_sync={level},folio_sdk={level}")),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("folio_sync=info,folio_sdk=info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut config = Config::load(&cli.config)?;

    // Apply CLI overrides
    if let Some(url) = cli.remote_url {
        config.remote.url = url;
    }
    if let Some(key) = cli.api_key {
        config.remote.api_key = key;
    }
    if let Some(owner_id) = cli.owner_id {
        config.sync.owner_id = owner_id;
    }
    if let Some(path) = cli.cache_path {
        config.cache.path = path;
    }

    let cache: Arc<dyn LocalCache> = Arc::new(FileCache::open(&config.cache.path, config.cache.quota_bytes)?);

    // Cache-only commands need neither the backend nor an owner id
    match &cli.command {
        Command::Show { key } => return show(cache.as_ref(), key),
        Command::Status => return status(cache.as_ref(), &config.cache.path),
        Command::Clear { keep_critical } => {
            cache.clear_all_except(&keep_list(*keep_critical));
            println!("Cleared {}", config.cache.path.display());
            return Ok(());
        }
        _ => {}
    }

    let sync_config = config.sync_config()?;
    let client = Arc::new(StoreClient::new(config.store_config())?);
    info!(remote = %config.remote.url, owner = %sync_config.owner_id, "Connecting");

    let orchestrator = SyncOrchestrator::new(client.clone(), cache, sync_config);

    match cli.command {
        Command::Sync { kinds } => {
            let kinds = parse_kinds(&kinds)?;
            let mut failed = false;

            for kind in kinds {
                let report = orchestrator.sync_entity_class(kind).await;
                let note = report.notification();
                let marker = match note.level {
                    NotificationLevel::Success => "ok",
                    NotificationLevel::Degraded => "degraded",
                    NotificationLevel::Failure => "failed",
                };
                println!("[{}] {}", marker, note);
                failed |= report.is_failed();
            }

            if failed {
                std::process::exit(1);
            }
        }
        Command::Profile => {
            let reader = CacheReader::new(orchestrator.fetcher().clone(), orchestrator.cache().clone());
            let resolved = reader.profile().await;
            let output = serde_json::json!({
                "source": resolved.source,
                "profile": resolved.value,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Command::Upload { kind, file, bucket } => {
            let (email, password) = match (&config.remote.email, &config.remote.password) {
                (Some(email), Some(password)) => (email.clone(), password.clone()),
                _ => anyhow::bail!("uploads need [remote] email and password"),
            };
            client.sign_in(&email, &password).await?;

            let data = std::fs::read(&file)?;
            let name = file
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or_else(|| anyhow::anyhow!("invalid file name: {}", file.display()))?;
            let bucket = bucket.unwrap_or_else(|| kind.default_bucket().to_string());
            let admin = ProfileAdmin::new(orchestrator);

            let url = match kind {
                UploadKind::Photo => {
                    admin
                        .upload_photo(&bucket, name, data, content_type(&file))
                        .await?
                }
                UploadKind::Resume => {
                    admin
                        .upload_resume(&bucket, name, data, content_type(&file))
                        .await?
                }
            };
            println!("{}", url);

            client.sign_out().await?;
        }
        Command::Show { .. } | Command::Status | Command::Clear { .. } => {}
    }

    Ok(())
}

fn parse_kinds(names: &[String]) -> anyhow::Result<Vec<EntityKind>> {
    if names.is_empty() {
        return Ok(EntityKind::ALL.to_vec());
    }
    names
        .iter()
        .map(|name| {
            EntityKind::from_name(name).ok_or_else(|| anyhow::anyhow!("unknown entity class: {}", name))
        })
        .collect()
}

/// Keys that survive `clear`
fn keep_list(keep_critical: bool) -> Vec<&'static str> {
    if keep_critical {
        CacheKey::CRITICAL.iter().map(CacheKey::as_str).collect()
    } else {
        Vec::new()
    }
}

fn show(cache: &dyn LocalCache, key: &str) -> anyhow::Result<()> {
    let key = CacheKey::from_str(key).ok_or_else(|| anyhow::anyhow!("unknown cache key: {}", key))?;
    match cache.get(key.as_str()) {
        Some(value) => println!("{}", value),
        None => println!("{} is not cached", key),
    }
    Ok(())
}

fn status(cache: &dyn LocalCache, path: &Path) -> anyhow::Result<()> {
    println!("Cache: {}", path.display());
    match cache.quota_bytes() {
        Some(quota) => println!("Used: {} / {} bytes", cache.used_bytes(), quota),
        None => println!("Used: {} bytes", cache.used_bytes()),
    }
    for key in cache.keys() {
        let size = cache.get(&key).map_or(0, |v| v.len());
        println!("  {:<26} {:>8} bytes", key, size);
    }
    Ok(())
}

fn content_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match extension.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("pdf") => "application/pdf",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kinds() {
        assert_eq!(parse_kinds(&[]).unwrap(), EntityKind::ALL.to_vec());
        assert_eq!(
            parse_kinds(&["family".into(), "profile".into()]).unwrap(),
            vec![EntityKind::FamilyMembers, EntityKind::Profile]
        );
        assert!(parse_kinds(&["gallery".into()]).is_err());
    }

    #[test]
    fn test_keep_list_follows_critical_keys() {
        assert_eq!(keep_list(true), vec!["profileImageUrl", "resumeUrl"]);
        assert!(keep_list(false).is_empty());
    }

    #[test]
    fn test_clear_keeps_critical_keys() {
        let cache = folio_sdk::MemoryCache::default();
        cache.set("personalProfile", "{}").unwrap();
        cache.set("profileImageUrl", "https://x/img.png").unwrap();
        cache.set("resumeUrl", "https://x/cv.pdf").unwrap();

        cache.clear_all_except(&keep_list(true));

        let mut keys = cache.keys();
        keys.sort();
        assert_eq!(keys, vec!["profileImageUrl", "resumeUrl"]);
    }

    #[test]
    fn test_content_type_from_extension() {
        assert_eq!(content_type(Path::new("me.JPG")), "image/jpeg");
        assert_eq!(content_type(Path::new("cv.pdf")), "application/pdf");
        assert_eq!(content_type(Path::new("notes")), "application/octet-stream");
    }
}
