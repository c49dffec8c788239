//! In-memory token store with proactive, single-flight refresh
//!
//! Owns one [`Credential`] per principal and decides when a refresh is
//! due. Callers never hold tokens themselves; they ask the store for a
//! fresh access token right before each request.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use super::client::OAuthClientError;
use super::traits::OAuthClientTrait;
use super::types::Credential;
use leadlink_domain::constants::REFRESH_SKEW_SECONDS;

/// Error type for token store operations
#[derive(Debug)]
pub enum TokenStoreError {
    /// No credential exists for the principal
    NotAuthenticated { principal: String },

    /// Credential is stale and carries no refresh token
    NoRefreshToken { principal: String },

    /// The refresh request itself failed; re-authorization is required
    RefreshFailed(OAuthClientError),

    /// Authorization URL building or code exchange failed
    AuthorizationFailed(OAuthClientError),
}

impl std::fmt::Display for TokenStoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAuthenticated { principal } => {
                write!(f, "No credential stored for principal {principal}")
            }
            Self::NoRefreshToken { principal } => {
                write!(f, "Credential for principal {principal} is stale and has no refresh token")
            }
            Self::RefreshFailed(e) => write!(f, "Token refresh failed: {e}"),
            Self::AuthorizationFailed(e) => write!(f, "Authorization failed: {e}"),
        }
    }
}

impl std::error::Error for TokenStoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::RefreshFailed(e) | Self::AuthorizationFailed(e) => Some(e),
            _ => None,
        }
    }
}

/// Per-principal credential store and refresh state machine
///
/// Credentials are swapped atomically: readers observe either the old
/// credential or the new one, never a partial update. Refreshes are
/// single-flight per principal; concurrent `ensure_fresh` callers on a
/// stale credential serialize behind one network refresh and all
/// receive the renewed token. The credential map lock is never held
/// across a network await.
pub struct TokenStore<C: OAuthClientTrait> {
    client: Arc<C>,
    credentials: RwLock<HashMap<String, Credential>>,
    refresh_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
    skew_seconds: i64,
}

impl<C: OAuthClientTrait> TokenStore<C> {
    /// Create a store with the default 5-minute refresh margin.
    #[must_use]
    pub fn new(client: Arc<C>) -> Self {
        Self::with_skew(client, REFRESH_SKEW_SECONDS)
    }

    /// Create a store with an explicit refresh margin in seconds.
    #[must_use]
    pub fn with_skew(client: Arc<C>, skew_seconds: i64) -> Self {
        Self {
            client,
            credentials: RwLock::new(HashMap::new()),
            refresh_locks: Mutex::new(HashMap::new()),
            skew_seconds,
        }
    }

    /// Get a snapshot of the credential for a principal, if any.
    pub async fn get(&self, principal: &str) -> Option<Credential> {
        self.credentials.read().await.get(principal).cloned()
    }

    /// Insert or replace the credential for its principal.
    pub async fn put(&self, credential: Credential) {
        let principal = credential.principal_id.clone();
        self.credentials.write().await.insert(principal.clone(), credential);
        debug!("Stored credential for principal {principal}");
    }

    /// Remove the credential for a principal. Returns whether one existed.
    pub async fn clear(&self, principal: &str) -> bool {
        let removed = self.credentials.write().await.remove(principal).is_some();
        if removed {
            info!("Cleared credential for principal {principal}");
        }
        removed
    }

    /// Whether any credential is stored for the principal.
    ///
    /// Presence only; the credential may be stale and still refreshable.
    pub async fn is_authenticated(&self, principal: &str) -> bool {
        self.credentials.read().await.contains_key(principal)
    }

    /// Principals with a stored credential.
    pub async fn principals(&self) -> Vec<String> {
        self.credentials.read().await.keys().cloned().collect()
    }

    /// Start a browser authorization flow.
    ///
    /// # Returns
    /// Tuple of (authorization_url, state)
    ///
    /// # Errors
    /// Returns error if URL building fails
    pub async fn begin_authorization(&self) -> Result<(String, String), TokenStoreError> {
        self.client
            .generate_authorization_url()
            .await
            .map_err(TokenStoreError::AuthorizationFailed)
    }

    /// Complete a browser authorization flow from the callback.
    ///
    /// Exchanges the code for tokens and stores the resulting
    /// credential under the principal the issuer reported (or the
    /// configured default).
    ///
    /// # Errors
    /// Returns error if state validation or the exchange fails
    pub async fn complete_authorization(
        &self,
        code: &str,
        state: &str,
    ) -> Result<Credential, TokenStoreError> {
        let response = self
            .client
            .exchange_code_for_tokens(code, state)
            .await
            .map_err(TokenStoreError::AuthorizationFailed)?;

        let credential = Credential::from_exchange(response, self.client.default_principal());
        info!("Authorization complete for principal {}", credential.principal_id);

        self.put(credential.clone()).await;
        Ok(credential)
    }

    /// Return a fresh access token for the principal, refreshing first
    /// if the stored credential is within the skew margin of expiry.
    ///
    /// Single-flight: concurrent callers on a stale credential
    /// serialize on a per-principal lock and re-check after acquiring
    /// it, so exactly one network refresh happens per expiry.
    ///
    /// # Errors
    /// Returns error if no credential exists, the credential is stale
    /// without a refresh token, or the refresh request fails. A failed
    /// refresh leaves the stale credential in place and is never
    /// retried internally.
    pub async fn ensure_fresh(&self, principal: &str) -> Result<String, TokenStoreError> {
        // Fast path: credential exists and is outside the skew margin
        {
            let credentials = self.credentials.read().await;
            match credentials.get(principal) {
                None => {
                    return Err(TokenStoreError::NotAuthenticated {
                        principal: principal.to_string(),
                    })
                }
                Some(credential) if !credential.is_expired(self.skew_seconds) => {
                    return Ok(credential.access_token.clone());
                }
                Some(_) => {}
            }
        }

        let refresh_lock = self.refresh_lock(principal).await;
        let _guard = refresh_lock.lock().await;

        // Re-check: another caller may have refreshed while we waited
        let prior = {
            let credentials = self.credentials.read().await;
            match credentials.get(principal) {
                None => {
                    return Err(TokenStoreError::NotAuthenticated {
                        principal: principal.to_string(),
                    })
                }
                Some(credential) if !credential.is_expired(self.skew_seconds) => {
                    return Ok(credential.access_token.clone());
                }
                Some(credential) => credential.clone(),
            }
        };

        let refresh_token = prior.refresh_token.clone().ok_or_else(|| {
            TokenStoreError::NoRefreshToken { principal: principal.to_string() }
        })?;

        debug!(
            "Credential for principal {principal} expires in {}s; refreshing",
            prior.seconds_until_expiry()
        );

        // Network refresh happens outside the credential map lock
        let response = match self.client.refresh_access_token(&refresh_token).await {
            Ok(response) => response,
            Err(e) => {
                warn!("Refresh failed for principal {principal}: {e}");
                return Err(TokenStoreError::RefreshFailed(e));
            }
        };

        let renewed = Credential::renewed_from(response, &prior);
        let access_token = renewed.access_token.clone();
        self.credentials.write().await.insert(principal.to_string(), renewed);
        info!("Refreshed credential for principal {principal}");

        Ok(access_token)
    }

    async fn refresh_lock(&self, principal: &str) -> Arc<Mutex<()>> {
        let mut locks = self.refresh_locks.lock().await;
        locks.entry(principal.to_string()).or_insert_with(|| Arc::new(Mutex::new(()))).clone()
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for auth::store.
    use std::time::Duration;

    use chrono::Utc;

    use super::*;
    use crate::testing::MockOAuthClient;
    use crate::auth::types::TokenResponse;

    fn credential(principal: &str, expires_in: i64, refresh: Option<&str>) -> Credential {
        Credential {
            access_token: format!("access_{principal}"),
            refresh_token: refresh.map(String::from),
            token_type: "Bearer".to_string(),
            scope: Some("conversations.readonly".to_string()),
            expires_at: Utc::now() + chrono::Duration::seconds(expires_in),
            principal_id: principal.to_string(),
            location_id: None,
        }
    }

    fn renewed_response() -> TokenResponse {
        TokenResponse {
            access_token: "access_renewed".to_string(),
            refresh_token: Some("refresh_next".to_string()),
            token_type: "Bearer".to_string(),
            expires_in: 86400,
            scope: None,
            user_id: None,
            location_id: None,
        }
    }

    #[tokio::test]
    async fn test_fresh_credential_skips_refresh() {
        let mock = Arc::new(MockOAuthClient::new());
        let store = TokenStore::new(mock.clone());
        store.put(credential("alice", 3600, Some("r1"))).await;

        let token = store.ensure_fresh("alice").await.unwrap();
        assert_eq!(token, "access_alice");
        assert_eq!(mock.refresh_count(), 0);
    }

    #[tokio::test]
    async fn test_stale_credential_triggers_refresh() {
        let mock = Arc::new(MockOAuthClient::new());
        mock.set_refresh_response(renewed_response());
        let store = TokenStore::new(mock.clone());

        // 60s remaining is inside the 300s margin
        store.put(credential("alice", 60, Some("r1"))).await;

        let token = store.ensure_fresh("alice").await.unwrap();
        assert_eq!(token, "access_renewed");
        assert_eq!(mock.refresh_count(), 1);

        // The stored credential was replaced and carries forward scope
        let stored = store.get("alice").await.unwrap();
        assert_eq!(stored.refresh_token.as_deref(), Some("refresh_next"));
        assert_eq!(stored.scope.as_deref(), Some("conversations.readonly"));
        assert_eq!(stored.principal_id, "alice");
    }

    #[tokio::test]
    async fn test_missing_credential() {
        let mock = Arc::new(MockOAuthClient::new());
        let store = TokenStore::new(mock);

        let result = store.ensure_fresh("nobody").await;
        assert!(matches!(result, Err(TokenStoreError::NotAuthenticated { .. })));
    }

    #[tokio::test]
    async fn test_stale_without_refresh_token() {
        let mock = Arc::new(MockOAuthClient::new());
        let store = TokenStore::new(mock.clone());
        store.put(credential("alice", 60, None)).await;

        let result = store.ensure_fresh("alice").await;
        assert!(matches!(result, Err(TokenStoreError::NoRefreshToken { .. })));
        assert_eq!(mock.refresh_count(), 0);
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_stale_credential() {
        let mock = Arc::new(MockOAuthClient::new());
        mock.fail_refresh(401, "invalid_grant");
        let store = TokenStore::new(mock.clone());
        store.put(credential("alice", 60, Some("r1"))).await;

        let result = store.ensure_fresh("alice").await;
        assert!(matches!(result, Err(TokenStoreError::RefreshFailed(_))));
        assert_eq!(mock.refresh_count(), 1);

        // Stale credential stays; no internal retry on the next call either
        let stored = store.get("alice").await.unwrap();
        assert_eq!(stored.access_token, "access_alice");
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_refresh() {
        let mock = Arc::new(MockOAuthClient::new());
        mock.set_refresh_response(renewed_response());
        mock.set_refresh_delay(Duration::from_millis(50));
        let store = Arc::new(TokenStore::new(mock.clone()));
        store.put(credential("alice", 60, Some("r1"))).await;

        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = store.clone();
            handles.push(tokio::spawn(async move { store.ensure_fresh("alice").await }));
        }

        for handle in handles {
            let token = handle.await.unwrap().unwrap();
            assert_eq!(token, "access_renewed");
        }
        assert_eq!(mock.refresh_count(), 1);
    }

    #[tokio::test]
    async fn test_refreshes_are_independent_per_principal() {
        let mock = Arc::new(MockOAuthClient::new());
        mock.set_refresh_response(renewed_response());
        let store = TokenStore::new(mock.clone());
        store.put(credential("alice", 60, Some("ra"))).await;
        store.put(credential("bob", 3600, Some("rb"))).await;

        store.ensure_fresh("alice").await.unwrap();
        let bob_token = store.ensure_fresh("bob").await.unwrap();

        assert_eq!(bob_token, "access_bob");
        assert_eq!(mock.refresh_count(), 1);
    }

    #[tokio::test]
    async fn test_clear_and_presence() {
        let mock = Arc::new(MockOAuthClient::new());
        let store = TokenStore::new(mock);
        store.put(credential("alice", 3600, None)).await;

        assert!(store.is_authenticated("alice").await);
        assert!(store.clear("alice").await);
        assert!(!store.is_authenticated("alice").await);
        assert!(!store.clear("alice").await);
    }
}
