//! Error types for the store client

use thiserror::Error;

/// Store client error
#[derive(Debug, Error)]
pub enum StoreError {
    /// HTTP request failed before a response arrived (connect, timeout, TLS)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Server rejected the credentials or no session is active
    #[error("Unauthorized ({status}): {message}")]
    Unauthorized { status: u16, message: String },

    /// Server returned an error
    #[error("Server error {status}: {message}")]
    Server { status: u16, message: String },

    /// Table, row or object not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid response from server
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Client could not be built from its configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl StoreError {
    /// True when the failure happened on the wire rather than at the server
    pub fn is_transport(&self) -> bool {
        matches!(self, StoreError::Http(_))
    }

    /// True when the request needs a (new) session
    pub fn is_auth(&self) -> bool {
        matches!(self, StoreError::Unauthorized { .. })
    }
}

/// Result type for store operations
pub type Result<T> = std::result::Result<T, StoreError>;
