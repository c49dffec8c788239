//! Paginated, date-filtered message retrieval
//!
//! Walks the messages endpoint newest-first, following the platform's
//! opaque cursor. Because pages arrive in reverse chronological order,
//! the first record older than the start date ends the walk; everything
//! after it is older still.

use std::sync::Arc;

use leadlink_domain::constants::DEFAULT_PAGE_SIZE;
use tracing::{debug, info};

use super::types::{FetchFilters, FetchMetadata, Message, MessagePage};
use crate::api::client::CrmApiClient;
use crate::api::errors::FetchError;

/// Result of a completed fetch run
#[derive(Debug)]
pub struct FetchOutcome {
    /// Retained messages, sorted ascending by timestamp
    pub messages: Vec<Message>,
    /// What the run looked at
    pub metadata: FetchMetadata,
}

/// Paginated message fetcher
pub struct MessageFetcher {
    client: Arc<CrmApiClient>,
    page_size: u32,
}

impl MessageFetcher {
    /// Create a fetcher with the default page size.
    #[must_use]
    pub fn new(client: Arc<CrmApiClient>) -> Self {
        Self { client, page_size: DEFAULT_PAGE_SIZE }
    }

    /// Create a fetcher with an explicit page size.
    #[must_use]
    pub fn with_page_size(client: Arc<CrmApiClient>, page_size: u32) -> Self {
        Self { client, page_size }
    }

    /// Fetch all messages in a conversation matching the filters
    ///
    /// Pages newest-first until the cursor runs out, a page comes back
    /// empty, or a record older than `start_date` appears. Records
    /// newer than `end_date` are scanned past without being retained.
    /// The retained set comes back sorted ascending by timestamp.
    ///
    /// # Errors
    /// Returns [`FetchError`] naming the failed page if any request
    /// fails; partial results are discarded.
    pub async fn fetch_messages(
        &self,
        principal: &str,
        conversation_id: &str,
        filters: &FetchFilters,
    ) -> Result<FetchOutcome, FetchError> {
        let path = format!("/conversations/{conversation_id}/messages");
        let type_param = filters.message_types.join(",");

        let mut retained: Vec<Message> = Vec::new();
        let mut cursor: Option<String> = None;
        let mut scanned = 0usize;
        let mut pages_fetched = 0u32;
        let mut reached_start = false;

        loop {
            pages_fetched += 1;

            let mut query: Vec<(&str, String)> = vec![("limit", self.page_size.to_string())];
            if let Some(cursor) = &cursor {
                query.push(("lastMessageId", cursor.clone()));
            }
            if !type_param.is_empty() {
                query.push(("type", type_param.clone()));
            }

            let page: MessagePage = self
                .client
                .get_json(principal, &path, &query)
                .await
                .map_err(|source| FetchError { page: pages_fetched, source })?;

            debug!(
                page = pages_fetched,
                items = page.items.len(),
                has_more = page.has_more,
                "fetched message page"
            );

            // An empty page means exhaustion even if hasMore claims otherwise
            if page.items.is_empty() {
                break;
            }

            for message in page.items {
                scanned += 1;
                let timestamp = message.timestamp_utc();

                if let Some(start) = filters.start_date {
                    // Newest-first: everything past this point is older
                    if timestamp < start {
                        reached_start = true;
                        break;
                    }
                }
                if let Some(end) = filters.end_date {
                    if timestamp > end {
                        continue;
                    }
                }
                // Type retention is enforced locally; the query param is
                // advisory upstream
                if !filters.message_types.is_empty() {
                    let matches = message
                        .message_type
                        .as_deref()
                        .is_some_and(|t| filters.message_types.iter().any(|wanted| wanted == t));
                    if !matches {
                        continue;
                    }
                }

                retained.push(message);
            }

            if reached_start {
                break;
            }

            cursor = page.next_cursor;
            if !page.has_more || cursor.is_none() {
                break;
            }
        }

        retained.sort_by_key(Message::timestamp_utc);

        info!(
            conversation_id = %conversation_id,
            scanned,
            retained = retained.len(),
            pages = pages_fetched,
            "message fetch complete"
        );

        let metadata = FetchMetadata {
            conversation_id: conversation_id.to_string(),
            total_scanned: scanned,
            total_retained: retained.len(),
            pages_fetched,
            filters: filters.clone(),
        };

        Ok(FetchOutcome { messages: retained, metadata })
    }
}
