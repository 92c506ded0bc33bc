//! Session Hooks Server
//!
//! Hook handler process the test runner connects to. Positional arguments
//! name the designated initialize transactions and override
//! `SESSION_HOOKS_INIT_TRANSACTION`.

use anyhow::{Context, Result};
use session_hooks::{logging, HookServer, HookServerConfig};

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_tracing();

    let mut config = HookServerConfig::from_env().context("Invalid hook handler configuration")?;
    let names: Vec<String> = std::env::args().skip(1).collect();
    if !names.is_empty() {
        config = config.with_init_transactions(names);
    }

    let server = HookServer::session_carrying(config);

    tokio::select! {
        result = server.start() => result,
        _ = tokio::signal::ctrl_c() => {
            logging::log_server_shutdown();
            Ok(())
        }
    }
}
