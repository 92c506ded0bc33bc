//! Hook handler configuration
//!
//! Defaults match what the test runner expects of a hook handler; every value
//! can be overridden through `SESSION_HOOKS_*` environment variables.

use {
    crate::error::{HookError, HookResult},
    serde::{Deserialize, Serialize},
};

/// Port the test runner connects to unless told otherwise.
pub const DEFAULT_PORT: u16 = 61321;

/// Designated initialize transaction of the REST API suite.
pub const DEFAULT_INIT_TRANSACTION: &str =
    "REST API after init > Initialize > Initialize from XML topology";

pub const ENV_HOST: &str = "SESSION_HOOKS_HOST";
pub const ENV_PORT: &str = "SESSION_HOOKS_PORT";
pub const ENV_MAX_MESSAGE_SIZE: &str = "SESSION_HOOKS_MAX_MESSAGE_SIZE";
pub const ENV_INIT_TRANSACTION: &str = "SESSION_HOOKS_INIT_TRANSACTION";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookServerConfig {
    /// Interface to listen on
    pub host: String,

    /// TCP port, 0 picks a free one
    pub port: u16,

    /// Maximum size of one message in bytes, delimiter excluded
    pub max_message_size: usize,

    /// Scenario names whose response establishes the session
    pub init_transactions: Vec<String>,
}

impl Default for HookServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            max_message_size: 2 * 1024 * 1024, // 2MB
            init_transactions: vec![DEFAULT_INIT_TRANSACTION.to_string()],
        }
    }
}

impl HookServerConfig {
    /// Defaults overridden by the process environment.
    pub fn from_env() -> HookResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable.
    pub fn from_lookup<F>(lookup: F) -> HookResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup(ENV_HOST) {
            config.host = host;
        }
        if let Some(port) = lookup(ENV_PORT) {
            config.port = port
                .trim()
                .parse()
                .map_err(|e| HookError::Config(format!("{ENV_PORT}={port}: {e}")))?;
        }
        if let Some(size) = lookup(ENV_MAX_MESSAGE_SIZE) {
            config.max_message_size = size
                .trim()
                .parse()
                .map_err(|e| HookError::Config(format!("{ENV_MAX_MESSAGE_SIZE}={size}: {e}")))?;
        }
        if let Some(names) = lookup(ENV_INIT_TRANSACTION) {
            config.init_transactions = names
                .split('|')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect();
        }

        config.validate()?;
        Ok(config)
    }

    /// Replace the designated initialize transactions.
    pub fn with_init_transactions<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.init_transactions = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn validate(&self) -> HookResult<()> {
        if self.max_message_size == 0 {
            return Err(HookError::Config("max_message_size must be positive".into()));
        }
        if self.init_transactions.is_empty() {
            return Err(HookError::Config(
                "at least one initialize transaction name is required".into(),
            ));
        }
        Ok(())
    }

    /// Listen address in `host:port` form, for logging.
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
