//! Application configuration and dependency container

use std::sync::Arc;

use leadlink_common::auth::{OAuthClient, OAuthConfig, TokenStore};
use leadlink_domain::constants::{DEFAULT_BASE_URL, DEFAULT_PRINCIPAL, DEFAULT_SCOPES};
use leadlink_domain::{LeadLinkError, Result};
use leadlink_infra::api::{
    AccessTokenProvider, CrmApiClient, CrmApiClientConfig, StaticTokenProvider,
    StoreTokenProvider,
};
use leadlink_infra::integrations::contacts::ContactsService;
use leadlink_infra::integrations::conversations::MessageFetcher;
use leadlink_infra::integrations::opportunities::OpportunitiesService;
use tracing::info;

/// Application configuration, loaded from the environment
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// OAuth client ID (`LEADLINK_CLIENT_ID`, required)
    pub client_id: String,
    /// OAuth client secret (`LEADLINK_CLIENT_SECRET`, required)
    pub client_secret: String,
    /// Redirect URI registered with the platform (`LEADLINK_REDIRECT_URI`)
    pub redirect_uri: String,
    /// Platform base URL (`LEADLINK_BASE_URL`)
    pub base_url: String,
    /// Principal used when the issuer does not name one (`LEADLINK_PRINCIPAL`)
    pub default_principal: String,
    /// Scopes to request (`LEADLINK_SCOPES`, space- or comma-separated)
    pub scopes: Vec<String>,
}

impl AppConfig {
    /// Load configuration from the environment.
    ///
    /// # Errors
    /// Returns `LeadLinkError::Config` if a required variable is
    /// missing or empty.
    pub fn from_env() -> Result<Self> {
        let client_id = required_var("LEADLINK_CLIENT_ID")?;
        let client_secret = required_var("LEADLINK_CLIENT_SECRET")?;

        let redirect_uri = optional_var("LEADLINK_REDIRECT_URI")
            .unwrap_or_else(|| "http://localhost:8000/oauth/callback".to_string());
        let base_url =
            optional_var("LEADLINK_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let default_principal =
            optional_var("LEADLINK_PRINCIPAL").unwrap_or_else(|| DEFAULT_PRINCIPAL.to_string());

        let scopes = match optional_var("LEADLINK_SCOPES") {
            Some(raw) => raw
                .split([' ', ','])
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            None => DEFAULT_SCOPES.iter().map(|s| (*s).to_string()).collect(),
        };

        Ok(Self { client_id, client_secret, redirect_uri, base_url, default_principal, scopes })
    }

    /// Load configuration for static-token use.
    ///
    /// A fixed API key authenticates on its own, so the OAuth client
    /// credentials are not read and stay empty; starting an
    /// authorization flow on such a config fails with a config error.
    #[must_use]
    pub fn from_env_static() -> Self {
        let base_url =
            optional_var("LEADLINK_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let default_principal =
            optional_var("LEADLINK_PRINCIPAL").unwrap_or_else(|| DEFAULT_PRINCIPAL.to_string());

        Self {
            client_id: String::new(),
            client_secret: String::new(),
            redirect_uri: String::new(),
            base_url,
            default_principal,
            scopes: Vec::new(),
        }
    }

    fn oauth_config(&self) -> OAuthConfig {
        let mut config = OAuthConfig::new(
            self.base_url.clone(),
            self.client_id.clone(),
            self.client_secret.clone(),
            self.redirect_uri.clone(),
            self.scopes.clone(),
        );
        config.default_principal = self.default_principal.clone();
        config
    }
}

fn required_var(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(LeadLinkError::Config(format!("{name} is not set"))),
    }
}

fn optional_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

/// Dependency container for the tool surface and the CLI
pub struct AppContext {
    /// Loaded configuration
    pub config: AppConfig,
    /// Credential store driving the OAuth lifecycle
    pub store: Arc<TokenStore<OAuthClient>>,
    /// Message fetcher over the authenticated API client
    pub messages: MessageFetcher,
    /// Contacts passthrough
    pub contacts: ContactsService,
    /// Opportunities passthrough
    pub opportunities: OpportunitiesService,
}

impl AppContext {
    /// Build a context whose API calls authenticate via the token store.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be constructed
    pub fn new(config: AppConfig) -> Result<Self> {
        let store = Arc::new(TokenStore::new(Arc::new(OAuthClient::new(config.oauth_config()))));
        let provider: Arc<dyn AccessTokenProvider> =
            Arc::new(StoreTokenProvider::new(store.clone()));

        Self::assemble(config, store, provider)
    }

    /// Build a context that authenticates with a fixed token instead
    /// of the OAuth lifecycle (private-integration API keys).
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be constructed
    pub fn with_static_token(config: AppConfig, token: String) -> Result<Self> {
        let store = Arc::new(TokenStore::new(Arc::new(OAuthClient::new(config.oauth_config()))));
        let provider: Arc<dyn AccessTokenProvider> = Arc::new(StaticTokenProvider::new(token));

        info!("Using static access token; OAuth lifecycle bypassed");
        Self::assemble(config, store, provider)
    }

    fn assemble(
        config: AppConfig,
        store: Arc<TokenStore<OAuthClient>>,
        provider: Arc<dyn AccessTokenProvider>,
    ) -> Result<Self> {
        let client_config =
            CrmApiClientConfig { base_url: config.base_url.clone(), ..Default::default() };
        let api = Arc::new(
            CrmApiClient::new(client_config, provider)
                .map_err(|e| LeadLinkError::Config(e.to_string()))?,
        );

        Ok(Self {
            config,
            store,
            messages: MessageFetcher::new(api.clone()),
            contacts: ContactsService::new(api.clone()),
            opportunities: OpportunitiesService::new(api),
        })
    }
}
