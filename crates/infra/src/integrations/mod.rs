//! Platform integrations

pub mod contacts;
pub mod conversations;
pub mod opportunities;
