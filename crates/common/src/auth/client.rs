//! OAuth 2.1 client implementation with PKCE support
//!
//! Handles browser-based authorization flow against the CRM platform,
//! including:
//! - PKCE challenge generation
//! - Browser authorization URL building
//! - Authorization code exchange
//! - Token refresh

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::pkce::PKCEChallenge;
use super::traits::OAuthClientTrait;
use super::types::{OAuthConfig, TokenResponse};

/// Error type for OAuth client operations
#[derive(Debug)]
pub enum OAuthClientError {
    /// HTTP request failed before a response was received
    RequestFailed(reqwest::Error),

    /// Token endpoint answered with a non-success status
    TokenEndpoint { status: u16, body: String },

    /// State parameter mismatch (CSRF attack detected)
    StateMismatch { expected: String, received: String },

    /// No pending PKCE challenge for this exchange
    VerifierMissing,

    /// Failed to parse response
    ParseError(String),

    /// No refresh token available
    NoRefreshToken,

    /// Invalid configuration
    ConfigError(String),

    /// PKCE challenge generation failed
    PKCEError(String),
}

impl std::fmt::Display for OAuthClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RequestFailed(e) => write!(f, "HTTP request failed: {e}"),
            Self::TokenEndpoint { status, body } => {
                write!(f, "Token endpoint error (HTTP {status}): {body}")
            }
            Self::StateMismatch { expected, received } => {
                write!(f, "State mismatch (CSRF): expected {expected}, received {received}")
            }
            Self::VerifierMissing => {
                write!(f, "No pending PKCE challenge; authorization must be restarted")
            }
            Self::ParseError(msg) => write!(f, "Parse error: {msg}"),
            Self::NoRefreshToken => write!(f, "No refresh token available"),
            Self::ConfigError(msg) => write!(f, "Configuration error: {msg}"),
            Self::PKCEError(msg) => write!(f, "PKCE generation error: {msg}"),
        }
    }
}

impl std::error::Error for OAuthClientError {}

impl From<reqwest::Error> for OAuthClientError {
    fn from(err: reqwest::Error) -> Self {
        Self::RequestFailed(err)
    }
}

/// OAuth 2.1 client with PKCE support
///
/// Implements RFC 6749 (OAuth 2.0) and RFC 7636 (PKCE) against the CRM
/// platform's `/oauth/authorize` and `/oauth/token` endpoints.
#[derive(Debug, Clone)]
pub struct OAuthClient {
    config: OAuthConfig,
    client: Client,
    current_challenge: Arc<Mutex<Option<PKCEChallenge>>>,
}

impl OAuthClient {
    /// Create a new OAuth client with the given configuration
    ///
    /// # Arguments
    /// * `config` - OAuth configuration (base URL, client credentials,
    ///   redirect URI, scopes)
    #[must_use]
    pub fn new(config: OAuthConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { config, client, current_challenge: Arc::new(Mutex::new(None)) }
    }

    /// Generate authorization URL for browser-based login
    ///
    /// The caller opens this URL in a browser; the platform redirects
    /// back to `redirect_uri` with `code` and `state` query parameters
    /// after the user grants access. A fresh PKCE challenge is stored
    /// for the subsequent exchange, replacing any prior pending one.
    ///
    /// # Returns
    /// Tuple of (authorization_url, state) where state must be validated in
    /// callback
    ///
    /// # Errors
    /// Returns error if the client ID is missing or PKCE challenge
    /// generation fails
    pub async fn generate_authorization_url(&self) -> Result<(String, String), OAuthClientError> {
        if self.config.client_id.is_empty() {
            return Err(OAuthClientError::ConfigError("client_id is not configured".to_string()));
        }

        // Generate new PKCE challenge
        let challenge =
            PKCEChallenge::generate().map_err(|e| OAuthClientError::PKCEError(e.to_string()))?;
        let state = challenge.state.clone();

        // Store challenge for later token exchange
        *self.current_challenge.lock().await = Some(challenge.clone());

        // Build authorization URL with query parameters
        let params = vec![
            ("response_type".to_string(), "code".to_string()),
            ("client_id".to_string(), self.config.client_id.clone()),
            ("redirect_uri".to_string(), self.config.redirect_uri.clone()),
            ("scope".to_string(), self.config.scope_string()),
            ("state".to_string(), state.clone()),
            ("code_challenge".to_string(), challenge.code_challenge.clone()),
            ("code_challenge_method".to_string(), challenge.challenge_method().to_string()),
        ];

        let query_string = params
            .iter()
            .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");

        let url = format!("{}?{}", self.config.authorization_url(), query_string);

        debug!("Generated authorization URL for client {}", self.config.client_id);

        Ok((url, state))
    }

    /// Exchange authorization code for tokens
    ///
    /// Called after the user completes browser authorization and is
    /// redirected back. Validates the state parameter before any
    /// network traffic, then posts the code and the stored verifier to
    /// the token endpoint. The pending challenge is consumed either
    /// way; a failed exchange requires a fresh authorization URL.
    ///
    /// # Arguments
    /// * `code` - Authorization code from redirect callback
    /// * `state` - State parameter from redirect (for CSRF validation)
    ///
    /// # Errors
    /// Returns error if:
    /// - No PKCE challenge is pending
    /// - State mismatch (CSRF attack)
    /// - Token exchange fails
    /// - Response parsing fails
    pub async fn exchange_code_for_tokens(
        &self,
        code: &str,
        state: &str,
    ) -> Result<TokenResponse, OAuthClientError> {
        // Retrieve and consume the pending challenge
        let challenge = self
            .current_challenge
            .lock()
            .await
            .take()
            .ok_or(OAuthClientError::VerifierMissing)?;

        // Validate state parameter (CSRF protection) before any network call
        if challenge.state != state {
            warn!("State mismatch during code exchange; rejecting callback");
            return Err(OAuthClientError::StateMismatch {
                expected: challenge.state,
                received: state.to_string(),
            });
        }

        let request_body = vec![
            ("grant_type".to_string(), "authorization_code".to_string()),
            ("client_id".to_string(), self.config.client_id.clone()),
            ("client_secret".to_string(), self.config.client_secret.clone()),
            ("code".to_string(), code.to_string()),
            ("redirect_uri".to_string(), self.config.redirect_uri.clone()),
            ("code_verifier".to_string(), challenge.code_verifier.clone()),
        ];

        let response =
            self.client.post(self.config.token_url()).form(&request_body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OAuthClientError::TokenEndpoint { status: status.as_u16(), body });
        }

        let token_response: TokenResponse =
            response.json().await.map_err(|e| OAuthClientError::ParseError(e.to_string()))?;

        debug!("Authorization code exchange succeeded");

        Ok(token_response)
    }

    /// Refresh access token using refresh token
    ///
    /// Used for obtaining new access tokens without user interaction.
    /// Should be called before the current access token expires
    /// (typically 5 minutes before).
    ///
    /// # Arguments
    /// * `refresh_token` - Refresh token from previous authorization
    ///
    /// # Errors
    /// Returns error if:
    /// - No refresh token provided
    /// - Refresh fails
    /// - Token is invalid/revoked
    pub async fn refresh_access_token(
        &self,
        refresh_token: &str,
    ) -> Result<TokenResponse, OAuthClientError> {
        if refresh_token.is_empty() {
            return Err(OAuthClientError::NoRefreshToken);
        }

        let params = vec![
            ("grant_type".to_string(), "refresh_token".to_string()),
            ("client_id".to_string(), self.config.client_id.clone()),
            ("client_secret".to_string(), self.config.client_secret.clone()),
            ("refresh_token".to_string(), refresh_token.to_string()),
        ];

        let response = self.client.post(self.config.token_url()).form(&params).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Token refresh rejected with HTTP {status}");
            return Err(OAuthClientError::TokenEndpoint { status: status.as_u16(), body });
        }

        let token_response: TokenResponse =
            response.json().await.map_err(|e| OAuthClientError::ParseError(e.to_string()))?;

        debug!("Token refresh succeeded");

        Ok(token_response)
    }

    /// Get the configured redirect URI
    #[must_use]
    pub fn redirect_uri(&self) -> &str {
        &self.config.redirect_uri
    }

    /// Get a reference to the OAuth configuration
    #[must_use]
    pub fn config(&self) -> &OAuthConfig {
        &self.config
    }
}

#[async_trait]
impl OAuthClientTrait for OAuthClient {
    async fn generate_authorization_url(&self) -> Result<(String, String), OAuthClientError> {
        self.generate_authorization_url().await
    }

    async fn exchange_code_for_tokens(
        &self,
        code: &str,
        state: &str,
    ) -> Result<TokenResponse, OAuthClientError> {
        self.exchange_code_for_tokens(code, state).await
    }

    async fn refresh_access_token(
        &self,
        refresh_token: &str,
    ) -> Result<TokenResponse, OAuthClientError> {
        self.refresh_access_token(refresh_token).await
    }

    fn default_principal(&self) -> &str {
        &self.config.default_principal
    }
}
