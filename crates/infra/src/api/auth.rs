//! API authentication via the token store
//!
//! Bridges the token store's credential lifecycle into the API client
//! through the [`AccessTokenProvider`] seam.

use std::sync::Arc;

use async_trait::async_trait;
use leadlink_common::auth::{OAuthClientTrait, TokenStore, TokenStoreError};
use tracing::debug;

use super::errors::ApiError;

/// Trait for providing access tokens
///
/// This trait allows dependency injection and testing with mock providers.
/// The principal is explicit on every call; nothing here assumes a
/// single logged-in user.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    /// Get a valid access token for the principal
    ///
    /// Implementations handle refresh if needed.
    async fn access_token(&self, principal: &str) -> Result<String, ApiError>;
}

/// Token provider backed by the OAuth token store
///
/// Every token request goes through `ensure_fresh`, so proactive
/// refresh and single-flight behavior come along for free.
pub struct StoreTokenProvider<C: OAuthClientTrait> {
    store: Arc<TokenStore<C>>,
}

impl<C: OAuthClientTrait> StoreTokenProvider<C> {
    /// Wrap a token store as an access token provider.
    #[must_use]
    pub fn new(store: Arc<TokenStore<C>>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<C: OAuthClientTrait> AccessTokenProvider for StoreTokenProvider<C> {
    async fn access_token(&self, principal: &str) -> Result<String, ApiError> {
        self.store.ensure_fresh(principal).await.map_err(|e| match e {
            TokenStoreError::NotAuthenticated { principal } => {
                ApiError::Unauthenticated(format!("no credential for principal {principal}"))
            }
            TokenStoreError::NoRefreshToken { principal } => ApiError::Unauthenticated(format!(
                "credential for principal {principal} is stale and cannot be refreshed"
            )),
            TokenStoreError::RefreshFailed(source) => {
                ApiError::Unauthenticated(format!("token refresh failed: {source}"))
            }
            TokenStoreError::AuthorizationFailed(source) => {
                ApiError::Unauthenticated(format!("authorization failed: {source}"))
            }
        })
    }
}

/// Token provider wrapping a fixed token
///
/// For private-integration API keys and for tests; no refresh, no
/// expiry tracking.
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    /// Wrap a pre-issued token.
    #[must_use]
    pub fn new(token: String) -> Self {
        Self { token }
    }
}

#[async_trait]
impl AccessTokenProvider for StaticTokenProvider {
    async fn access_token(&self, principal: &str) -> Result<String, ApiError> {
        debug!("Serving static token for principal {principal}");
        Ok(self.token.clone())
    }
}
