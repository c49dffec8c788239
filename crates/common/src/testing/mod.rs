//! Test support
//!
//! A scriptable [`MockOAuthClient`] for exercising the token store and
//! anything else generic over [`OAuthClientTrait`] without a live
//! token endpoint.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::auth::{OAuthClientError, OAuthClientTrait, TokenResponse};

/// Scriptable OAuth client double
///
/// Refresh behavior is configured up front; the mock counts refresh
/// calls so tests can assert single-flight behavior. An optional delay
/// widens the race window for concurrency tests.
pub struct MockOAuthClient {
    refresh_response: Mutex<Option<TokenResponse>>,
    refresh_failure: Mutex<Option<(u16, String)>>,
    refresh_delay: Mutex<Option<Duration>>,
    refresh_calls: AtomicUsize,
    exchange_response: Mutex<Option<TokenResponse>>,
    default_principal: String,
}

impl MockOAuthClient {
    /// Create a mock with no scripted behavior.
    #[must_use]
    pub fn new() -> Self {
        Self {
            refresh_response: Mutex::new(None),
            refresh_failure: Mutex::new(None),
            refresh_delay: Mutex::new(None),
            refresh_calls: AtomicUsize::new(0),
            exchange_response: Mutex::new(None),
            default_principal: "default_user".to_string(),
        }
    }

    /// Script the response every refresh call returns.
    pub fn set_refresh_response(&self, response: TokenResponse) {
        if let Ok(mut slot) = self.refresh_response.lock() {
            *slot = Some(response);
        }
    }

    /// Script every refresh call to fail with a token endpoint error.
    pub fn fail_refresh(&self, status: u16, body: &str) {
        if let Ok(mut slot) = self.refresh_failure.lock() {
            *slot = Some((status, body.to_string()));
        }
    }

    /// Delay each refresh call, widening the window for races.
    pub fn set_refresh_delay(&self, delay: Duration) {
        if let Ok(mut slot) = self.refresh_delay.lock() {
            *slot = Some(delay);
        }
    }

    /// Script the response the next code exchange returns.
    pub fn set_exchange_response(&self, response: TokenResponse) {
        if let Ok(mut slot) = self.exchange_response.lock() {
            *slot = Some(response);
        }
    }

    /// Number of refresh calls observed so far.
    #[must_use]
    pub fn refresh_count(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }
}

impl Default for MockOAuthClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OAuthClientTrait for MockOAuthClient {
    async fn generate_authorization_url(&self) -> Result<(String, String), OAuthClientError> {
        Ok(("https://mock.invalid/oauth/authorize?state=mock_state".to_string(),
            "mock_state".to_string()))
    }

    async fn exchange_code_for_tokens(
        &self,
        _code: &str,
        state: &str,
    ) -> Result<TokenResponse, OAuthClientError> {
        if state != "mock_state" {
            return Err(OAuthClientError::StateMismatch {
                expected: "mock_state".to_string(),
                received: state.to_string(),
            });
        }

        let scripted = self.exchange_response.lock().ok().and_then(|slot| slot.clone());
        scripted.ok_or_else(|| {
            OAuthClientError::ConfigError("no exchange response scripted".to_string())
        })
    }

    async fn refresh_access_token(
        &self,
        _refresh_token: &str,
    ) -> Result<TokenResponse, OAuthClientError> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);

        let delay = self.refresh_delay.lock().ok().and_then(|slot| *slot);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let failure = self.refresh_failure.lock().ok().and_then(|slot| slot.clone());
        if let Some((status, body)) = failure {
            return Err(OAuthClientError::TokenEndpoint { status, body });
        }

        let scripted = self.refresh_response.lock().ok().and_then(|slot| slot.clone());
        scripted.ok_or_else(|| {
            OAuthClientError::ConfigError("no refresh response scripted".to_string())
        })
    }

    fn default_principal(&self) -> &str {
        &self.default_principal
    }
}
