use thiserror::Error;

#[derive(Debug, Error)]
pub enum HookError {
    // Wire Errors
    #[error("Message too large: {0} bytes (max: {1})")]
    MessageTooLarge(usize, usize),

    #[error("Invalid payload for event {event}: {reason}")]
    InvalidPayload { event: String, reason: String },

    #[error("Connection closed mid-message")]
    UnexpectedEof,

    // Configuration Errors
    #[error("Invalid configuration: {0}")]
    Config(String),

    // IO Errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // JSON Errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl HookError {
    /// Whether the connection can keep going after this error.
    ///
    /// A malformed message only costs that one message; anything that leaves
    /// the byte stream in an unknown state ends the connection.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Json(_) | Self::InvalidPayload { .. })
    }
}

// Result type alias for convenience
pub type HookResult<T> = Result<T, HookError>;
