//! Shared domain types for LeadLink
//!
//! This crate holds the pieces every other crate agrees on: the
//! application-wide error taxonomy and the constants of the remote CRM
//! platform's API surface. It deliberately has no I/O dependencies.

pub mod constants;
pub mod errors;

pub use errors::{LeadLinkError, Result};
