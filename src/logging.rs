//! Hook Handler Logging Module
//!
//! Structured logging for the hook handler using the tracing crate.
//! Includes connection tracking, per-message spans and session events.

use {
    crate::headers::HeaderValue,
    std::time::{Duration, Instant},
    tracing::{debug, error, info, span, trace, warn, Level, Span},
    tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter},
    uuid::Uuid,
};

/// Initialize the tracing subscriber with appropriate configuration
pub fn init_tracing() {
    // Try to get log level from environment, default to info
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("session_hooks=info"));

    // The runner relays handler output into its own log, keep it compact
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_ansi(false);

    let json_format = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    if json_format {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .init();
    }

    debug!("Tracing initialized");
}

/// Identifies one runner connection, and with it one test run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookConnectionId(pub String);

impl HookConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for HookConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for HookConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Create a span for tracking a connection lifecycle
pub fn connection_span(connection_id: &HookConnectionId) -> Span {
    span!(
        Level::INFO,
        "hook_connection",
        connection_id = %connection_id,
        start_time = ?Instant::now()
    )
}

/// Create a span for one runner message
pub fn message_span(event: &str, uuid: &str) -> Span {
    span!(Level::DEBUG, "hook_message", event = %event, uuid = %uuid)
}

/// Connection events
pub fn log_connection_opened(connection_id: &HookConnectionId, peer: &str) {
    info!(
        connection_id = %connection_id,
        peer = %peer,
        event = "connection_opened",
        "Test runner connected"
    );
}

pub fn log_connection_closed(connection_id: &HookConnectionId, messages: usize, duration: Duration) {
    info!(
        connection_id = %connection_id,
        messages = messages,
        duration_ms = duration.as_millis(),
        event = "connection_closed",
        "Test runner disconnected"
    );
}

pub fn log_connection_error(connection_id: &HookConnectionId, error: &str) {
    error!(
        connection_id = %connection_id,
        error = %error,
        event = "connection_error",
        "Closing connection after error"
    );
}

/// Message events
pub fn log_message_received(message_size: usize) {
    trace!(
        message_size = message_size,
        event = "message_received",
        "Received message"
    );
}

pub fn log_event_dispatched(event: &str, transactions: usize, duration: Duration) {
    debug!(
        hook_event = %event,
        transactions = transactions,
        duration_us = duration.as_micros(),
        event = "event_dispatched",
        "Ran hooks for event"
    );
}

pub fn log_parse_error(error: &str, raw_message: &str) {
    error!(
        error = %error,
        raw_message = %raw_message,
        event = "parse_error",
        "Failed to parse message"
    );
}

pub fn log_unknown_event(event: &str) {
    warn!(
        hook_event = %event,
        event = "unknown_event",
        "Unknown hook event, echoing payload unchanged"
    );
}

/// Session events
pub fn log_session_captured(connection_id: &HookConnectionId, transaction: &str, cookie: &HeaderValue) {
    info!(
        connection_id = %connection_id,
        transaction = %transaction,
        cookie = %cookie,
        event = "session_captured",
        "Captured session cookie"
    );
}

pub fn log_capture_skipped(transaction: &str, reason: &str) {
    warn!(
        transaction = %transaction,
        reason = %reason,
        event = "capture_skipped",
        "Initialize transaction did not yield a session cookie"
    );
}

pub fn log_cookie_injected(transaction: &str) {
    debug!(
        transaction = %transaction,
        event = "cookie_injected",
        "Injected session cookie"
    );
}

pub fn log_body_normalized(transaction: &str, side: &str) {
    debug!(
        transaction = %transaction,
        side = %side,
        event = "body_normalized",
        "Stripped whitespace from XML body"
    );
}

/// Server lifecycle logging
pub fn log_server_startup(addr: &str, init_transactions: &[String]) {
    info!(
        address = %addr,
        init_transactions = ?init_transactions,
        event = "server_startup",
        "Starting hook handler"
    );
}

pub fn log_server_ready(addr: &str) {
    info!(
        address = %addr,
        event = "server_ready",
        "Hook handler ready and listening"
    );
}

pub fn log_server_shutdown() {
    info!(event = "server_shutdown", "Hook handler shutting down");
}
