//! Opportunity tools

use std::time::Instant;

use serde_json::json;

use super::{domain_error, finish, ToolResponse};
use crate::context::AppContext;

/// List opportunities for a principal.
pub async fn get_opportunities(ctx: &AppContext, principal: &str, limit: u32) -> ToolResponse {
    let started = Instant::now();
    let response = match ctx.opportunities.list(principal, limit).await {
        Ok(opportunities) => ToolResponse::ok(json!({
            "count": opportunities.len(),
            "opportunities": opportunities,
        })),
        Err(e) => ToolResponse::error(&domain_error(e)),
    };
    finish("get_opportunities", started, response)
}
