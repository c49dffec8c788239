//! Tool-call surface
//!
//! JSON-in/JSON-out functions a protocol server or the CLI can call.
//! Every tool returns a [`ToolResponse`] envelope; internal errors are
//! translated to a stable kind label plus a human-readable message and
//! never cross the boundary raw.

pub mod auth;
pub mod contacts;
pub mod messages;
pub mod opportunities;

use std::time::Instant;

use leadlink_domain::LeadLinkError;
use leadlink_infra::api::{ApiError, FetchError};
use serde::Serialize;
use tracing::warn;

use crate::utils::logging::log_tool_execution;

/// Envelope every tool returns
#[derive(Debug, Serialize)]
pub struct ToolResponse {
    /// `"ok"` or `"error"`
    pub status: String,

    /// Human-readable detail; always present on errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Tool-specific payload on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl ToolResponse {
    /// Successful response carrying a payload.
    #[must_use]
    pub fn ok<T: Serialize>(data: T) -> Self {
        match serde_json::to_value(data) {
            Ok(value) => Self { status: "ok".to_string(), message: None, data: Some(value) },
            Err(e) => Self::error(&LeadLinkError::Internal(format!(
                "failed to serialize tool payload: {e}"
            ))),
        }
    }

    /// Successful response with a message and no payload.
    #[must_use]
    pub fn ok_message(message: impl Into<String>) -> Self {
        Self { status: "ok".to_string(), message: Some(message.into()), data: None }
    }

    /// Error response labeled by the domain error kind.
    #[must_use]
    pub fn error(error: &LeadLinkError) -> Self {
        warn!(kind = error.label(), "tool call failed: {error}");
        Self {
            status: "error".to_string(),
            message: Some(format!("[{}] {error}", error.label())),
            data: None,
        }
    }
}

/// Record a finished tool call and hand its envelope back.
pub(crate) fn finish(tool: &str, started: Instant, response: ToolResponse) -> ToolResponse {
    log_tool_execution(tool, started.elapsed(), response.status == "ok");
    response
}

/// Map an infra API error into the transport-facing domain taxonomy.
pub(crate) fn domain_error(error: ApiError) -> LeadLinkError {
    match error {
        ApiError::Unauthenticated(reason) => LeadLinkError::Auth(reason),
        ApiError::Upstream { status, body } => {
            LeadLinkError::Network(format!("upstream HTTP {status}: {body}"))
        }
        ApiError::Network(reason) => LeadLinkError::Network(reason),
        ApiError::Decode(reason) => LeadLinkError::Internal(format!("decode failure: {reason}")),
        ApiError::Config(reason) => LeadLinkError::Config(reason),
    }
}

/// Map a fetch failure, preserving the failed page number.
pub(crate) fn fetch_domain_error(error: FetchError) -> LeadLinkError {
    let page = error.page;
    match domain_error(error.source) {
        LeadLinkError::Auth(reason) => LeadLinkError::Auth(reason),
        other => LeadLinkError::Network(format!("page {page}: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_envelope_shape() {
        let response = ToolResponse::ok(serde_json::json!({"count": 3}));
        let rendered = serde_json::to_value(&response).unwrap();
        assert_eq!(rendered["status"], "ok");
        assert_eq!(rendered["data"]["count"], 3);
        assert!(rendered.get("message").is_none());
    }

    #[test]
    fn test_error_envelope_carries_kind_label() {
        let response = ToolResponse::error(&LeadLinkError::Auth("no credential".to_string()));
        let rendered = serde_json::to_value(&response).unwrap();
        assert_eq!(rendered["status"], "error");
        let message = rendered["message"].as_str().unwrap();
        assert!(message.starts_with("[auth]"));
        assert!(message.contains("no credential"));
    }

    #[test]
    fn test_finish_passes_the_envelope_through() {
        let started = Instant::now();
        let response = finish("demo_tool", started, ToolResponse::ok_message("done"));
        assert_eq!(response.status, "ok");
        assert_eq!(response.message.as_deref(), Some("done"));

        let response =
            finish("demo_tool", started, ToolResponse::error(&LeadLinkError::Network("down".to_string())));
        assert_eq!(response.status, "error");
    }

    #[test]
    fn test_api_error_mapping() {
        let mapped = domain_error(ApiError::Unauthenticated("stale".to_string()));
        assert!(matches!(mapped, LeadLinkError::Auth(_)));

        let mapped = domain_error(ApiError::Upstream { status: 502, body: "boom".to_string() });
        assert!(matches!(mapped, LeadLinkError::Network(_)));
    }

    #[test]
    fn test_fetch_error_mapping_keeps_page() {
        let mapped = fetch_domain_error(FetchError {
            page: 4,
            source: ApiError::Network("reset".to_string()),
        });
        assert!(mapped.to_string().contains("page 4"));
    }
}
