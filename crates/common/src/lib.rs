//! Shared authentication infrastructure for LeadLink
//!
//! Home of the OAuth 2.1 + PKCE client, the credential types, and the
//! token store that owns credential lifetime (expiry detection and
//! single-flight refresh). Everything network-facing lives behind the
//! [`auth::OAuthClientTrait`] seam so higher layers can be tested with
//! mocks.

pub mod auth;
pub mod testing;
