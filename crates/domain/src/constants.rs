//! Constants of the remote CRM platform's API surface

/// Default base URL for the remote CRM API and its OAuth endpoints.
pub const DEFAULT_BASE_URL: &str = "https://services.leadconnectorhq.com";

/// API version header value required by the platform on every call.
pub const API_VERSION: &str = "2021-07-28";

/// Messages requested per page when walking a conversation.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Seconds before stated expiry at which a credential is treated as
/// stale. Refreshing this early avoids a credential lapsing mid-flight
/// during an outbound call.
pub const REFRESH_SKEW_SECONDS: i64 = 300;

/// Principal used when the issuer's token response does not identify
/// the user and no principal was configured.
pub const DEFAULT_PRINCIPAL: &str = "default_user";

/// OAuth scopes requested by default during authorization.
pub const DEFAULT_SCOPES: &[&str] = &[
    "contacts.readonly",
    "contacts.write",
    "opportunities.readonly",
    "opportunities.write",
    "calendars.readonly",
    "calendars.write",
    "conversations.readonly",
    "conversations.write",
    "workflows.readonly",
    "locations.readonly",
    "users.readonly",
];
