//! Shared application utilities

pub mod logging;
