//! Infrastructure layer for LeadLink
//!
//! HTTP access to the CRM platform: the authenticated API client, the
//! access-token provider seam over the token store, and the
//! conversation message fetcher with date filtering and pagination.

pub mod api;
pub mod integrations;
