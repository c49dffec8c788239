//! OAuth credential types and configuration
//!
//! Wire shapes for the token endpoint and the in-memory credential the
//! token store owns.

use chrono::{DateTime, Utc};
use leadlink_domain::constants::DEFAULT_PRINCIPAL;
use serde::{Deserialize, Serialize};

/// A complete credential for one principal
///
/// Created from a token endpoint response; replaced wholesale on
/// refresh, never field-by-field. `expires_at` is always derived at
/// receipt time as `now + expires_in` — server-relative rather than
/// server-absolute, so clock skew between issuer and holder does not
/// shift the expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credential {
    /// Bearer access token for API authentication
    pub access_token: String,

    /// Refresh token for obtaining the next credential
    /// Optional because the issuer may omit one on refresh responses
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Token type (always "Bearer" for this platform)
    pub token_type: String,

    /// Granted scopes, space-separated, as reported by the issuer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    /// Absolute expiration timestamp (UTC), derived at receipt
    pub expires_at: DateTime<Utc>,

    /// Principal this credential belongs to
    pub principal_id: String,

    /// CRM location the grant is scoped to, when the issuer reports one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_id: Option<String>,
}

impl Credential {
    /// Build a credential from a fresh authorization-code exchange.
    ///
    /// The principal comes from the issuer's `userId` field when
    /// present, otherwise from `fallback_principal`.
    #[must_use]
    pub fn from_exchange(response: TokenResponse, fallback_principal: &str) -> Self {
        let expires_at = Utc::now() + chrono::Duration::seconds(response.expires_in);
        let principal_id =
            response.user_id.unwrap_or_else(|| fallback_principal.to_string());

        Self {
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            token_type: response.token_type,
            scope: response.scope,
            expires_at,
            principal_id,
            location_id: response.location_id,
        }
    }

    /// Build the replacement credential after a refresh.
    ///
    /// Issuers are allowed to omit fields on refresh responses; the
    /// refresh token, scope, principal and location carry forward from
    /// the prior credential when absent.
    #[must_use]
    pub fn renewed_from(response: TokenResponse, prior: &Self) -> Self {
        let expires_at = Utc::now() + chrono::Duration::seconds(response.expires_in);

        Self {
            access_token: response.access_token,
            refresh_token: response.refresh_token.or_else(|| prior.refresh_token.clone()),
            token_type: response.token_type,
            scope: response.scope.or_else(|| prior.scope.clone()),
            expires_at,
            principal_id: prior.principal_id.clone(),
            location_id: response.location_id.or_else(|| prior.location_id.clone()),
        }
    }

    /// Whether the credential is expired or will expire within the
    /// given threshold.
    #[must_use]
    pub fn is_expired(&self, threshold_seconds: i64) -> bool {
        Utc::now() + chrono::Duration::seconds(threshold_seconds) >= self.expires_at
    }

    /// Seconds until the credential lapses (negative if already lapsed).
    #[must_use]
    pub fn seconds_until_expiry(&self) -> i64 {
        (self.expires_at - Utc::now()).num_seconds()
    }
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

/// Token endpoint response (RFC 6749 §5.1, plus the platform's
/// `userId`/`locationId` extensions)
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    pub expires_in: i64,
    pub scope: Option<String>,
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
    #[serde(rename = "locationId")]
    pub location_id: Option<String>,
}

/// OAuth client configuration for the remote CRM platform
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    /// Base URL hosting both the API and its OAuth endpoints
    pub base_url: String,

    /// OAuth client ID issued by the platform
    pub client_id: String,

    /// OAuth client secret issued by the platform
    pub client_secret: String,

    /// Redirect URI registered for this client
    pub redirect_uri: String,

    /// Scopes to request, order-preserving
    pub scopes: Vec<String>,

    /// Principal to fall back on when the issuer does not identify one
    pub default_principal: String,
}

impl OAuthConfig {
    /// Create a new OAuth configuration.
    #[must_use]
    pub fn new(
        base_url: String,
        client_id: String,
        client_secret: String,
        redirect_uri: String,
        scopes: Vec<String>,
    ) -> Self {
        Self {
            base_url,
            client_id,
            client_secret,
            redirect_uri,
            scopes,
            default_principal: DEFAULT_PRINCIPAL.to_string(),
        }
    }

    /// Authorization endpoint URL.
    #[must_use]
    pub fn authorization_url(&self) -> String {
        format!("{}/oauth/authorize", self.base_url)
    }

    /// Token endpoint URL.
    #[must_use]
    pub fn token_url(&self) -> String {
        format!("{}/oauth/token", self.base_url)
    }

    /// Scopes as the space-separated string the wire format wants.
    #[must_use]
    pub fn scope_string(&self) -> String {
        self.scopes.join(" ")
    }
}
