//! Trait abstraction over the OAuth client
//!
//! The token store is generic over this trait so tests can drive the
//! refresh state machine with a mock instead of a live token endpoint.

use async_trait::async_trait;

use super::client::OAuthClientError;
use super::types::TokenResponse;

/// Operations the token store needs from an OAuth client
#[async_trait]
pub trait OAuthClientTrait: Send + Sync {
    /// Build the browser authorization URL and remember the PKCE
    /// challenge for the matching exchange.
    async fn generate_authorization_url(&self) -> Result<(String, String), OAuthClientError>;

    /// Exchange an authorization code (plus callback state) for tokens.
    async fn exchange_code_for_tokens(
        &self,
        code: &str,
        state: &str,
    ) -> Result<TokenResponse, OAuthClientError>;

    /// Obtain a new token response from a refresh token.
    async fn refresh_access_token(
        &self,
        refresh_token: &str,
    ) -> Result<TokenResponse, OAuthClientError>;

    /// Principal to assign when the issuer does not identify one.
    fn default_principal(&self) -> &str;
}
