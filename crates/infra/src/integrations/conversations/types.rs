//! Wire types for the conversation messages endpoint

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// One message in a conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Platform-assigned message ID
    pub id: String,

    /// Message type, e.g. `TYPE_SMS`, `TYPE_CALL`, `TYPE_EMAIL`
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub message_type: Option<String>,

    /// Message text, empty for calls and some system messages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,

    /// Email subject, present on `TYPE_EMAIL` messages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,

    /// `inbound` or `outbound`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,

    /// Delivery status as reported by the platform
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    /// Creation timestamp, ISO 8601; naive values are treated as UTC
    #[serde(rename = "dateAdded", default, skip_serializing_if = "Option::is_none")]
    pub date_added: Option<String>,

    /// Conversation this message belongs to
    #[serde(rename = "conversationId", default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,

    /// Contact on the other end
    #[serde(rename = "contactId", default, skip_serializing_if = "Option::is_none")]
    pub contact_id: Option<String>,

    /// Type-specific metadata (call duration and the like)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<MessageMeta>,
}

/// Type-specific message metadata
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageMeta {
    /// Call duration in seconds
    #[serde(rename = "callDuration", default, skip_serializing_if = "Option::is_none")]
    pub call_duration: Option<i64>,

    /// Call outcome as reported by the platform
    #[serde(rename = "callStatus", default, skip_serializing_if = "Option::is_none")]
    pub call_status: Option<String>,
}

impl Message {
    /// Creation timestamp as UTC
    ///
    /// Naive timestamps (no offset) are assumed UTC. Missing or
    /// unparseable timestamps map to the minimum UTC instant so they
    /// sort first and never mask newer records.
    #[must_use]
    pub fn timestamp_utc(&self) -> DateTime<Utc> {
        self.date_added.as_deref().map_or(DateTime::<Utc>::MIN_UTC, parse_timestamp)
    }

    /// One-line human-readable rendering
    ///
    /// Calls render their duration, emails and texts their body.
    #[must_use]
    pub fn display_line(&self) -> String {
        let timestamp = match self.timestamp_utc() {
            t if t == DateTime::<Utc>::MIN_UTC => "unknown time".to_string(),
            t => t.format("%Y-%m-%d %H:%M").to_string(),
        };
        let direction = self.direction.as_deref().unwrap_or("unknown");
        let kind = self.message_type.as_deref().unwrap_or("TYPE_UNKNOWN");

        let content = match kind {
            "TYPE_CALL" => {
                let meta = self.meta.clone().unwrap_or_default();
                let duration = meta
                    .call_duration
                    .map_or_else(|| "unknown".to_string(), |seconds| format!("{seconds}s"));
                let status = meta.call_status.unwrap_or_else(|| "unknown".to_string());
                format!("Call - duration: {duration}, status: {status}")
            }
            "TYPE_EMAIL" => {
                let subject = self.subject.as_deref().unwrap_or("No subject");
                let body = self.body.as_deref().unwrap_or("");
                format!("Subject: {subject} | {body}")
            }
            _ => self.body.clone().unwrap_or_else(|| "(no content)".to_string()),
        };

        format!("[{timestamp}] {direction} {kind}: {content}")
    }
}

/// Parse a platform timestamp into UTC
///
/// Accepts RFC 3339 with offset, or a naive ISO 8601 value which is
/// assumed UTC. Anything else maps to the minimum UTC instant.
#[must_use]
pub fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(raw) {
        return with_offset.with_timezone(&Utc);
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return naive.and_utc();
        }
        if format == "%Y-%m-%d" {
            if let Ok(date) = chrono::NaiveDate::parse_from_str(raw, format) {
                if let Some(naive) = date.and_hms_opt(0, 0, 0) {
                    return naive.and_utc();
                }
            }
        }
    }
    DateTime::<Utc>::MIN_UTC
}

/// One page of the messages endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct MessagePage {
    /// Messages on this page, newest first
    #[serde(default)]
    pub items: Vec<Message>,

    /// Opaque cursor for the next page, echoed back as `lastMessageId`
    #[serde(rename = "nextCursor", default)]
    pub next_cursor: Option<String>,

    /// Whether the platform claims more pages exist
    #[serde(rename = "hasMore", default)]
    pub has_more: bool,
}

/// Filters applied during a fetch
#[derive(Debug, Clone, Default, Serialize)]
pub struct FetchFilters {
    /// Oldest timestamp to retain (inclusive)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,

    /// Newest timestamp to retain (inclusive)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,

    /// Message types to request, empty means all
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub message_types: Vec<String>,
}

/// What a fetch run looked at and kept
#[derive(Debug, Clone, Serialize)]
pub struct FetchMetadata {
    /// Conversation the run walked
    pub conversation_id: String,

    /// Records examined across all pages
    pub total_scanned: usize,

    /// Records retained after filtering
    pub total_retained: usize,

    /// Pages requested, including a final empty one
    pub pages_fetched: u32,

    /// Filters the run applied
    pub filters: FetchFilters,
}
