//! Types for the store client API

use serde::{Deserialize, Serialize};

/// A single table row as returned by the REST table API
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Base URL of the hosted backend (e.g. "https://abc.example.co")
    pub base_url: String,
    /// Public (anon) API key sent with every request
    pub api_key: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_timeout() -> u64 {
    30
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:54321".to_string(),
            api_key: String::new(),
            timeout_secs: default_timeout(),
        }
    }
}

/// Equality filter on one column (`column=eq.value`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub column: String,
    pub value: String,
}

impl Filter {
    pub fn eq(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }
}

/// Sort direction for `order=`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        }
    }
}

/// One `order=` term
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub column: String,
    pub direction: Direction,
}

/// Query options for row retrieval and deletion
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowQuery {
    /// Equality filters (AND logic)
    pub filters: Vec<Filter>,
    /// Ordering, applied in sequence
    pub order: Vec<OrderBy>,
    /// Maximum rows
    pub limit: Option<u32>,
}

impl RowQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter_eq(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push(Filter::eq(column, value));
        self
    }

    pub fn order_asc(mut self, column: impl Into<String>) -> Self {
        self.order.push(OrderBy {
            column: column.into(),
            direction: Direction::Asc,
        });
        self
    }

    pub fn order_desc(mut self, column: impl Into<String>) -> Self {
        self.order.push(OrderBy {
            column: column.into(),
            direction: Direction::Desc,
        });
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Render as REST query parameters, without the leading `?`
    pub fn to_query_string(&self) -> String {
        let mut params = vec!["select=*".to_string()];
        for filter in &self.filters {
            params.push(format!(
                "{}=eq.{}",
                urlencoding::encode(&filter.column),
                urlencoding::encode(&filter.value)
            ));
        }
        if !self.order.is_empty() {
            let terms: Vec<String> = self
                .order
                .iter()
                .map(|o| format!("{}.{}", o.column, o.direction.as_str()))
                .collect();
            params.push(format!("order={}", terms.join(",")));
        }
        if let Some(limit) = self.limit {
            params.push(format!("limit={}", limit));
        }
        params.join("&")
    }
}

/// Request body for password sign-in
#[derive(Debug, Clone, Serialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

/// Authenticated user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Active session returned by the auth service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Lifetime in seconds
    #[serde(default)]
    pub expires_in: Option<u64>,
    pub user: AuthUser,
}

/// Response from an object upload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    /// Storage key ("bucket/path")
    #[serde(rename = "Key")]
    pub key: String,
}
