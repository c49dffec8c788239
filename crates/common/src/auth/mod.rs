//! OAuth 2.1 + PKCE infrastructure
//!
//! Implements the full credential lifecycle against the remote CRM
//! platform's OAuth endpoints:
//!
//! - **PKCE**: RFC 7636 verifier/challenge/state generation
//! - **Authorization**: browser authorization URL building
//! - **Exchange**: authorization code → credential, with mandatory
//!   CSRF state validation before any network call
//! - **Refresh**: proactive refresh with a configurable skew margin,
//!   single-flight per principal
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────┐
//! │   TokenStore   │  Credential ownership + refresh state machine
//! └───────┬────────┘
//!         │
//!         ├──► OAuthClient      (HTTP: authorize URL, exchange, refresh)
//!         │         │
//!         │         └──► PKCE utilities (challenge generation)
//!         │
//!         └──► Credential map   (per-principal, in-memory)
//! ```
//!
//! Credentials are held in memory only; durable storage across process
//! restarts is intentionally out of scope.

pub mod client;
pub mod pkce;
pub mod store;
pub mod traits;
pub mod types;

pub use client::{OAuthClient, OAuthClientError};
pub use pkce::{
    generate_code_challenge, generate_code_verifier, generate_state, validate_state, PKCEChallenge,
};
pub use store::{TokenStore, TokenStoreError};
pub use traits::OAuthClientTrait;
pub use types::{Credential, OAuthConfig, TokenResponse};
