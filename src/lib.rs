//! Session-Carrying Hook Handler Library
//!
//! Hooks for an HTTP API contract-testing runner. They capture the session
//! cookie issued by a designated initialize transaction, replay it on every
//! later request, and strip whitespace from XML bodies on both sides of the
//! expected/real comparison. The hooks run in-process through
//! [`HookRegistry`] or out-of-process through [`HookServer`], which speaks the
//! runner's newline-delimited JSON hook protocol.

pub mod config;
pub mod error;
pub mod filters;
pub mod handler;
pub mod headers;
pub mod hooks;
pub mod logging;
pub mod normalize;
pub mod protocol;
pub mod server;
pub mod session;
pub mod transaction;

// Test modules
#[cfg(test)]
mod tests;

// Re-export key types
pub use config::HookServerConfig;
pub use error::{HookError, HookResult};
pub use handler::HookHandler;
pub use headers::{HeaderMap, HeaderValue};
pub use hooks::{HookRegistry, TransactionHook};
pub use server::HookServer;
pub use session::{HookContext, SessionStore};
pub use transaction::{ExpectedResponse, RealResponse, Request, Transaction};
