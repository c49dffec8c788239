//! Tracing initialization and tool-call logging helpers

use std::time::Duration;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber.
///
/// Respects `RUST_LOG`; defaults to `info` for this workspace's crates
/// and `warn` elsewhere.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,leadlink_api=info,leadlink_common=info,leadlink_infra=info"));

    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

/// Log the outcome of a tool execution with structured fields.
///
/// `tool` must be a stable identifier without sensitive data.
#[inline]
pub fn log_tool_execution(tool: &str, elapsed: Duration, success: bool) {
    let duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);

    if success {
        info!(tool, duration_ms, "tool_execution_success");
    } else {
        warn!(tool, duration_ms, "tool_execution_failure");
    }
}
