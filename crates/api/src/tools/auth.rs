//! Authorization tools

use std::time::Instant;

use leadlink_domain::LeadLinkError;
use serde_json::json;

use super::{finish, ToolResponse};
use crate::context::AppContext;

/// Start a browser authorization flow.
///
/// Returns the URL the user must open and the state the callback must
/// echo.
pub async fn begin_authorization(ctx: &AppContext) -> ToolResponse {
    let started = Instant::now();
    let response = match ctx.store.begin_authorization().await {
        Ok((authorization_url, state)) => ToolResponse::ok(json!({
            "authorization_url": authorization_url,
            "state": state,
        })),
        Err(e) => ToolResponse::error(&LeadLinkError::Auth(e.to_string())),
    };
    finish("begin_authorization", started, response)
}

/// Complete the authorization flow from the callback's code and state.
pub async fn complete_authorization(ctx: &AppContext, code: &str, state: &str) -> ToolResponse {
    let started = Instant::now();
    let response = match ctx.store.complete_authorization(code, state).await {
        Ok(credential) => ToolResponse::ok(json!({
            "principal_id": credential.principal_id,
            "location_id": credential.location_id,
            "scope": credential.scope,
            "expires_at": credential.expires_at.to_rfc3339(),
        })),
        Err(e) => ToolResponse::error(&LeadLinkError::Auth(e.to_string())),
    };
    finish("complete_authorization", started, response)
}

/// Report whether a principal holds a credential and how long it lasts.
pub async fn get_auth_status(ctx: &AppContext, principal: &str) -> ToolResponse {
    let started = Instant::now();
    let response = match ctx.store.get(principal).await {
        Some(credential) => ToolResponse::ok(json!({
            "authenticated": true,
            "principal_id": credential.principal_id,
            "location_id": credential.location_id,
            "scope": credential.scope,
            "expires_at": credential.expires_at.to_rfc3339(),
            "expires_in_seconds": credential.seconds_until_expiry(),
        })),
        None => ToolResponse::ok(json!({
            "authenticated": false,
            "principal_id": principal,
        })),
    };
    finish("get_auth_status", started, response)
}

/// Drop a principal's credential.
pub async fn logout(ctx: &AppContext, principal: &str) -> ToolResponse {
    let started = Instant::now();
    let response = if ctx.store.clear(principal).await {
        ToolResponse::ok_message(format!("credential cleared for {principal}"))
    } else {
        ToolResponse::error(&LeadLinkError::NotFound(format!(
            "no credential stored for {principal}"
        )))
    };
    finish("logout", started, response)
}
