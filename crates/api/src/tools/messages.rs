//! Conversation message tools

use std::time::Instant;

use chrono::{DateTime, Utc};
use leadlink_infra::integrations::conversations::FetchFilters;
use serde_json::json;

use super::{fetch_domain_error, finish, ToolResponse};
use crate::context::AppContext;

/// Fetch a conversation's messages within an optional date window.
///
/// Messages come back oldest-first alongside the run's metadata.
pub async fn fetch_conversation_messages(
    ctx: &AppContext,
    principal: &str,
    conversation_id: &str,
    start_date: Option<DateTime<Utc>>,
    end_date: Option<DateTime<Utc>>,
    message_types: Vec<String>,
) -> ToolResponse {
    let started = Instant::now();
    let filters = FetchFilters { start_date, end_date, message_types };

    let response = match ctx.messages.fetch_messages(principal, conversation_id, &filters).await {
        Ok(outcome) => ToolResponse::ok(json!({
            "messages": outcome.messages,
            "metadata": outcome.metadata,
        })),
        Err(e) => ToolResponse::error(&fetch_domain_error(e)),
    };
    finish("fetch_conversation_messages", started, response)
}
