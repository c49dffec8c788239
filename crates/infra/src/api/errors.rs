//! API-specific error types
//!
//! Distinguishes authentication failures (an access token could not be
//! produced) from upstream rejections (the platform answered with a
//! non-success status) so callers can tell "log in again" apart from
//! "the request itself was bad".

use thiserror::Error;

/// API operation errors
#[derive(Debug, Error)]
pub enum ApiError {
    /// No valid access token could be produced for the request
    #[error("Not authenticated: {0}")]
    Unauthenticated(String),

    /// The platform answered with a non-success status
    #[error("Upstream error (HTTP {status}): {body}")]
    Upstream { status: u16, body: String },

    /// The request never produced a response
    #[error("Network error: {0}")]
    Network(String),

    /// The response body could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// Client-side configuration problem
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// Whether re-authorization would help.
    #[must_use]
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Self::Unauthenticated(_) | Self::Upstream { status: 401 | 403, .. })
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

/// A pagination run that failed partway through
///
/// Carries the 1-based page number that failed. Partial results are
/// discarded; the caller gets this error instead.
#[derive(Debug, Error)]
#[error("Fetch failed on page {page}: {source}")]
pub struct FetchError {
    /// 1-based index of the page whose request failed
    pub page: u32,
    /// Underlying API error
    #[source]
    pub source: ApiError,
}
