//! Application layer for LeadLink
//!
//! Wires configuration, the OAuth token store, and the CRM services
//! into an [`context::AppContext`], and exposes the tool-call surface
//! the CLI (and any protocol server) drives.

pub mod context;
pub mod tools;
pub mod utils;

pub use context::{AppConfig, AppContext};
