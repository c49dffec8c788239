//! Conversation message retrieval
//!
//! Wire types for the messages endpoint and the paginated,
//! date-filtered fetcher that walks it newest-first.

pub mod fetcher;
pub mod types;

pub use fetcher::{FetchOutcome, MessageFetcher};
pub use types::{FetchFilters, FetchMetadata, Message, MessagePage};
