//! HTTP client for the hosted table, blob and auth API

use crate::error::{Result, StoreError};
use crate::types::*;
use reqwest::{header, Client, RequestBuilder, StatusCode};
use std::time::Duration;
use tokio::sync::RwLock;

/// HTTP client for the hosted backend
///
/// Every call is a single attempt; failures are returned immediately.
///
/// # Example
///
/// ```rust,no_run
/// use folio_store_client::{RowQuery, StoreClient, StoreConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = StoreClient::new(StoreConfig {
///     base_url: "https://abc.example.co".into(),
///     api_key: "anon-key".into(),
///     ..Default::default()
/// })?;
///
/// let rows = client
///     .select("connections", &RowQuery::new().order_asc("position"))
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct StoreClient {
    config: StoreConfig,
    client: Client,
    session: RwLock<Option<Session>>,
}

impl StoreClient {
    /// Create a new store client
    pub fn new(config: StoreConfig) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        let api_key = header::HeaderValue::from_str(&config.api_key)
            .map_err(|e| StoreError::Config(format!("invalid api key: {}", e)))?;
        headers.insert("apikey", api_key);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            config,
            client,
            session: RwLock::new(None),
        })
    }

    /// Get the client configuration
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    // ==================== Auth API ====================

    /// Sign in with email + password and keep the session for later calls
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let url = format!("{}/auth/v1/token?grant_type=password", self.config.base_url);

        let body = SignInRequest {
            email: email.to_string(),
            password: password.to_string(),
        };

        let response = self
            .client
            .post(&url)
            .header(header::CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await?;

        let session: Session = self.handle_response(response).await?;
        tracing::info!(user = %session.user.id, "Signed in");
        *self.session.write().await = Some(session.clone());
        Ok(session)
    }

    /// End the current session (no-op when signed out)
    pub async fn sign_out(&self) -> Result<()> {
        if self.session.read().await.is_none() {
            return Ok(());
        }

        let url = format!("{}/auth/v1/logout", self.config.base_url);
        let response = self.authorized(self.client.post(&url)).await.send().await?;
        *self.session.write().await = None;
        self.handle_empty(response).await
    }

    /// Current session, if signed in
    pub async fn session(&self) -> Option<Session> {
        self.session.read().await.clone()
    }

    // ==================== Table API ====================

    /// Select rows from a table
    pub async fn select(&self, table: &str, query: &RowQuery) -> Result<Vec<Row>> {
        let url = format!(
            "{}/rest/v1/{}?{}",
            self.config.base_url,
            urlencoding::encode(table),
            query.to_query_string()
        );

        let response = self.authorized(self.client.get(&url)).await.send().await?;
        self.handle_response(response).await
    }

    /// Insert or update rows, merging on the primary key
    pub async fn upsert(&self, table: &str, rows: &[Row]) -> Result<()> {
        if rows.is_empty() {
            return Ok(());
        }

        let url = format!("{}/rest/v1/{}", self.config.base_url, urlencoding::encode(table));

        let request = self
            .client
            .post(&url)
            .header(header::CONTENT_TYPE, "application/json")
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(rows);

        let response = self.authorized(request).await.send().await?;
        self.handle_empty(response).await
    }

    /// Delete rows matching every filter in `query`
    ///
    /// An unfiltered delete is refused client-side.
    pub async fn delete(&self, table: &str, query: &RowQuery) -> Result<()> {
        if query.filters.is_empty() {
            return Err(StoreError::Config(format!(
                "refusing unfiltered delete on {}",
                table
            )));
        }

        let url = format!(
            "{}/rest/v1/{}?{}",
            self.config.base_url,
            urlencoding::encode(table),
            query.to_query_string()
        );

        let response = self.authorized(self.client.delete(&url)).await.send().await?;
        self.handle_empty(response).await
    }

    // ==================== Blob API ====================

    /// Upload an object, replacing any existing one at the same path
    ///
    /// Returns the public URL of the stored object.
    pub async fn upload(
        &self,
        bucket: &str,
        path: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<String> {
        let object_path = encode_object_path(path);
        let url = format!(
            "{}/storage/v1/object/{}/{}",
            self.config.base_url,
            urlencoding::encode(bucket),
            object_path
        );

        let request = self
            .client
            .post(&url)
            .header(header::CONTENT_TYPE, content_type)
            .header("x-upsert", "true")
            .body(data);

        let response = self.authorized(request).await.send().await?;
        let uploaded: UploadResponse = self.handle_response(response).await?;
        tracing::debug!(key = %uploaded.key, "Uploaded object");

        Ok(self.public_url(bucket, path))
    }

    /// Public URL for an object in a public bucket
    pub fn public_url(&self, bucket: &str, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.config.base_url,
            urlencoding::encode(bucket),
            encode_object_path(path)
        )
    }

    // ==================== Helper Methods ====================

    async fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        let token = match self.session.read().await.as_ref() {
            Some(session) => session.access_token.clone(),
            None => self.config.api_key.clone(),
        };
        request.header(header::AUTHORIZATION, format!("Bearer {}", token))
    }

    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        let response = self.check_status(response).await?;
        let body = response.json().await?;
        Ok(body)
    }

    async fn handle_empty(&self, response: reqwest::Response) -> Result<()> {
        self.check_status(response).await?;
        Ok(())
    }

    async fn check_status(&self, response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let code = status.as_u16();
        let body = response.text().await.unwrap_or_default();

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(StoreError::Unauthorized {
                status: code,
                message: body,
            }),
            StatusCode::NOT_FOUND => Err(StoreError::NotFound(body)),
            _ => Err(StoreError::Server {
                status: code,
                message: body,
            }),
        }
    }
}

/// Percent-encode each segment of an object path, keeping the separators
fn encode_object_path(path: &str) -> String {
    path.trim_start_matches('/')
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
