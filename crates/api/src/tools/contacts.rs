//! Contact tools

use std::time::Instant;

use leadlink_infra::integrations::contacts::NewContact;
use serde_json::json;

use super::{domain_error, finish, ToolResponse};
use crate::context::AppContext;

/// Search contacts by name or email.
pub async fn search_contacts(
    ctx: &AppContext,
    principal: &str,
    query: &str,
    limit: u32,
) -> ToolResponse {
    let started = Instant::now();
    let response = match ctx.contacts.search(principal, query, limit).await {
        Ok(contacts) => ToolResponse::ok(json!({
            "count": contacts.len(),
            "contacts": contacts,
        })),
        Err(e) => ToolResponse::error(&domain_error(e)),
    };
    finish("search_contacts", started, response)
}

/// Create a contact.
pub async fn create_contact(
    ctx: &AppContext,
    principal: &str,
    contact: &NewContact,
) -> ToolResponse {
    let started = Instant::now();
    let response = match ctx.contacts.create(principal, contact).await {
        Ok(created) => ToolResponse::ok(json!({ "contact": created })),
        Err(e) => ToolResponse::error(&domain_error(e)),
    };
    finish("create_contact", started, response)
}
