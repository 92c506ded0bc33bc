//! Per-run session state.
//!
//! A `HookContext` is created for every test run (one runner connection) and
//! handed to each hook invocation, so isolated runs never see each other's
//! session cookie.

use {
    crate::{headers::HeaderValue, logging::HookConnectionId},
    tracing::debug,
};

/// Holds the session cookie captured from the designated initialize
/// transaction.
///
/// Empty until the first capture; afterwards every capture overwrites the
/// previous value. Nothing ever clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionStore {
    cookie: Option<HeaderValue>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `cookie`, replacing any earlier value (last write wins).
    pub fn capture(&mut self, cookie: HeaderValue) {
        if let Some(previous) = self.cookie.replace(cookie) {
            debug!(previous = %previous, "Replacing previously captured session cookie");
        }
    }

    pub fn cookie(&self) -> Option<&HeaderValue> {
        self.cookie.as_ref()
    }

    pub fn is_established(&self) -> bool {
        self.cookie.is_some()
    }
}

/// State shared by all hooks of one test run.
#[derive(Debug, Clone)]
pub struct HookContext {
    pub connection_id: HookConnectionId,
    pub session: SessionStore,
}

impl HookContext {
    pub fn new() -> Self {
        Self::for_connection(HookConnectionId::new())
    }

    pub fn for_connection(connection_id: HookConnectionId) -> Self {
        Self {
            connection_id,
            session: SessionStore::new(),
        }
    }
}

impl Default for HookContext {
    fn default() -> Self {
        Self::new()
    }
}
