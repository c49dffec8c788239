//! Authenticated HTTP client for the CRM API
//!
//! Every request fetches a fresh access token from the provider and
//! carries the platform's required `Version` header.

use std::sync::Arc;
use std::time::Duration;

use leadlink_domain::constants::{API_VERSION, DEFAULT_BASE_URL};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, instrument};

use super::auth::AccessTokenProvider;
use super::errors::ApiError;

/// Configuration for the CRM API client
#[derive(Debug, Clone)]
pub struct CrmApiClientConfig {
    /// Base URL for the platform API
    pub base_url: String,
    /// Timeout for API requests
    pub timeout: Duration,
}

impl Default for CrmApiClientConfig {
    fn default() -> Self {
        Self { base_url: DEFAULT_BASE_URL.to_string(), timeout: Duration::from_secs(30) }
    }
}

/// CRM API client with per-request token acquisition
pub struct CrmApiClient {
    http: Client,
    auth: Arc<dyn AccessTokenProvider>,
    config: CrmApiClientConfig,
}

impl CrmApiClient {
    /// Create a new API client
    ///
    /// # Errors
    /// Returns error if the underlying HTTP client cannot be built
    pub fn new(
        config: CrmApiClientConfig,
        auth: Arc<dyn AccessTokenProvider>,
    ) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ApiError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, auth, config })
    }

    /// Base URL this client talks to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Execute a GET request and deserialize the JSON response
    ///
    /// # Arguments
    /// * `principal` - Principal whose token authenticates the request
    /// * `path` - API path (e.g., "/conversations/abc/messages")
    /// * `query` - Query parameters
    ///
    /// # Errors
    /// Returns error if no token is available, the request fails, the
    /// platform answers non-2xx, or the body cannot be decoded
    #[instrument(skip(self, query), fields(path = %path))]
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        principal: &str,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let token = self.auth.access_token(principal).await?;
        let url = format!("{}{}", self.config.base_url, path);

        debug!(url = %url, "GET request");

        let response = self
            .http
            .get(&url)
            .query(query)
            .header("Authorization", format!("Bearer {token}"))
            .header("Version", API_VERSION)
            .header("Accept", "application/json")
            .send()
            .await?;

        Self::decode_response(response, &url).await
    }

    /// Execute a POST request with a JSON body and deserialize the
    /// JSON response
    ///
    /// # Errors
    /// Returns error if no token is available, the request fails, the
    /// platform answers non-2xx, or the body cannot be decoded
    #[instrument(skip(self, body), fields(path = %path))]
    pub async fn post_json<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        principal: &str,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let token = self.auth.access_token(principal).await?;
        let url = format!("{}{}", self.config.base_url, path);

        debug!(url = %url, "POST request");

        let response = self
            .http
            .post(&url)
            .json(body)
            .header("Authorization", format!("Bearer {token}"))
            .header("Version", API_VERSION)
            .header("Accept", "application/json")
            .send()
            .await?;

        Self::decode_response(response, &url).await
    }

    /// Execute an arbitrary request with an optional JSON body
    ///
    /// Untyped escape hatch for endpoints without a dedicated wrapper.
    ///
    /// # Errors
    /// Returns error if no token is available, the request fails, the
    /// platform answers non-2xx, or the body cannot be decoded
    #[instrument(skip(self, body), fields(method = %method, path = %path))]
    pub async fn request(
        &self,
        principal: &str,
        method: reqwest::Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<serde_json::Value, ApiError> {
        let token = self.auth.access_token(principal).await?;
        let url = format!("{}{}", self.config.base_url, path);

        let mut builder = self
            .http
            .request(method, &url)
            .header("Authorization", format!("Bearer {token}"))
            .header("Version", API_VERSION)
            .header("Accept", "application/json");
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        Self::decode_response(response, &url).await
    }

    async fn decode_response<T: DeserializeOwned>(
        response: reqwest::Response,
        url: &str,
    ) -> Result<T, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!(url = %url, status = %status, "upstream rejected request");
            return Err(ApiError::Upstream { status: status.as_u16(), body });
        }

        response.json::<T>().await.map_err(|e| ApiError::Decode(e.to_string()))
    }
}
