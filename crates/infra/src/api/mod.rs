//! Authenticated HTTP access to the CRM API

pub mod auth;
pub mod client;
pub mod errors;

pub use auth::{AccessTokenProvider, StaticTokenProvider, StoreTokenProvider};
pub use client::{CrmApiClient, CrmApiClientConfig};
pub use errors::{ApiError, FetchError};
