//! Error types for the folio SDK

use crate::cache::CacheError;
use thiserror::Error;

/// Result type for SDK operations
pub type Result<T> = std::result::Result<T, SdkError>;

/// Failure reported by a [`RemoteStore`](crate::traits::RemoteStore) call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// Request never completed (connect, timeout, TLS)
    #[error("Network failure: {0}")]
    NetworkFailure(String),

    /// No session, or the session lacks permission
    #[error("Authentication required: {0}")]
    AuthRequired(String),

    /// Backend answered with an error status
    #[error("Rejected by store ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// Backend answered with something we could not read
    #[error("Undecodable response: {0}")]
    Decode(String),
}

/// Why a sync ended in `Failed`
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// Fetch from the remote store failed; previous cache left untouched
    #[error("Fetch failed: {0}")]
    Remote(#[from] RemoteError),

    /// The owner's profile row does not exist
    #[error("Profile not found: {0}")]
    ProfileNotFound(String),

    /// Rows could not be turned into entity records
    #[error("Malformed rows: {0}")]
    Decode(String),

    /// Snapshot could not be encoded as JSON
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Local cache rejected every degradation tier, or failed for a non-quota reason
    #[error("Local cache error: {0}")]
    Storage(#[from] CacheError),
}

/// SDK error types
#[derive(Error, Debug)]
pub enum SdkError {
    /// Remote store call failed
    #[error("Remote store error: {0}")]
    Remote(#[from] RemoteError),

    /// Local cache call failed
    #[error("Local cache error: {0}")]
    Cache(#[from] CacheError),

    /// Sync ended in `Failed`
    #[error("Sync error: {0}")]
    Sync(#[from] SyncError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Input rejected before any write
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for SdkError {
    fn from(err: serde_json::Error) -> Self {
        SdkError::Serialization(err.to_string())
    }
}

#[cfg(feature = "client")]
impl From<folio_store_client::StoreError> for RemoteError {
    fn from(err: folio_store_client::StoreError) -> Self {
        use folio_store_client::StoreError;

        match err {
            StoreError::Http(e) if e.is_decode() => RemoteError::Decode(e.to_string()),
            StoreError::Http(e) => RemoteError::NetworkFailure(e.to_string()),
            StoreError::Unauthorized { message, .. } => RemoteError::AuthRequired(message),
            StoreError::Server { status, message } => RemoteError::Rejected { status, message },
            StoreError::NotFound(message) => RemoteError::Rejected {
                status: 404,
                message,
            },
            StoreError::Json(e) => RemoteError::Decode(e.to_string()),
            StoreError::InvalidResponse(message) => RemoteError::Decode(message),
            StoreError::Config(message) => RemoteError::Rejected { status: 0, message },
        }
    }
}
