//! Rust client for the hosted backend behind the folio site
//!
//! Three surfaces over one HTTP connection pool:
//! - REST table API (`select`, `upsert`, `delete`)
//! - Object storage (`upload`, `public_url`)
//! - Password session auth (`sign_in`, `sign_out`)
//!
//! # Example
//!
//! ```rust,no_run
//! use folio_store_client::{RowQuery, StoreClient, StoreConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = StoreClient::new(StoreConfig {
//!     base_url: "https://abc.example.co".into(),
//!     api_key: "anon-key".into(),
//!     ..Default::default()
//! })?;
//!
//! client.sign_in("admin@example.com", "secret").await?;
//!
//! let profile = client
//!     .select("profiles", &RowQuery::new().filter_eq("id", "owner-1"))
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod types;

// Re-export main types
pub use client::StoreClient;
pub use error::{Result, StoreError};
pub use types::*;
