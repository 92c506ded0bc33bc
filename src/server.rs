//! Hook Handler Server
//!
//! Listens for test runner connections. Each connection is one test run: it
//! gets its own `HookContext`, and its messages are handled strictly one after
//! another, so the session store needs no locking.

use {
    crate::{
        config::HookServerConfig,
        handler::HookHandler,
        hooks::HookRegistry,
        logging::{self, HookConnectionId},
        protocol::{read_frame, write_frame},
        session::HookContext,
        error::HookResult,
    },
    anyhow::{Context, Result},
    std::{net::SocketAddr, time::Instant},
    tokio::{
        io::{AsyncRead, AsyncWrite, BufReader},
        net::TcpListener,
        task::JoinHandle,
    },
    tokio_stream::{wrappers::TcpListenerStream, StreamExt},
    tracing::{debug, warn, Instrument},
};

pub struct HookServer {
    config: HookServerConfig,
    handler: HookHandler,
}

impl HookServer {
    /// Create a server running the hooks in `registry`.
    pub fn new(config: HookServerConfig, registry: HookRegistry) -> Self {
        Self {
            config,
            handler: HookHandler::new(registry),
        }
    }

    /// Create a server carrying the session from every initialize transaction
    /// named in `config`.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use session_hooks::{HookServer, HookServerConfig};
    ///
    /// #[tokio::main]
    /// async fn main() -> anyhow::Result<()> {
    ///     let config = HookServerConfig::from_env()?;
    ///     HookServer::session_carrying(config).start().await
    /// }
    /// ```
    pub fn session_carrying(config: HookServerConfig) -> Self {
        let mut names = config.init_transactions.iter();
        let first = names
            .next()
            .map(String::as_str)
            .unwrap_or(crate::config::DEFAULT_INIT_TRANSACTION);
        let registry = names.fold(HookRegistry::session_carrying(first), |registry, name| {
            registry.with_session_capture(name)
        });
        Self::new(config, registry)
    }

    pub fn config(&self) -> &HookServerConfig {
        &self.config
    }

    /// Bind the configured address and serve until the task is dropped.
    pub async fn start(self) -> Result<()> {
        let listener = self.bind().await?;
        self.serve(listener).await
    }

    /// Bind, spawn the accept loop and return the bound address.
    ///
    /// With `port` set to 0 the OS picks a free port, which is what tests want.
    pub async fn start_dynamic(self) -> Result<(JoinHandle<Result<()>>, SocketAddr)> {
        let listener = self.bind().await?;
        let addr = listener.local_addr().context("Listener has no local address")?;
        let handle = tokio::spawn(self.serve(listener));
        Ok((handle, addr))
    }

    async fn bind(&self) -> Result<TcpListener> {
        let address = self.config.listen_address();
        logging::log_server_startup(&address, &self.config.init_transactions);

        let listener = TcpListener::bind((self.config.host.as_str(), self.config.port))
            .await
            .with_context(|| format!("Could not bind to {address}"))?;

        let bound = listener.local_addr().context("Listener has no local address")?;
        logging::log_server_ready(&bound.to_string());
        Ok(listener)
    }

    async fn serve(self, listener: TcpListener) -> Result<()> {
        let mut incoming = TcpListenerStream::new(listener);

        while let Some(stream) = incoming.next().await {
            let stream = match stream {
                Ok(stream) => stream,
                Err(e) => {
                    warn!(error = %e, "Failed to accept connection");
                    continue;
                }
            };
            let peer = stream
                .peer_addr()
                .map(|addr| addr.to_string())
                .unwrap_or_else(|_| "unknown".to_string());
            if let Err(e) = stream.set_nodelay(true) {
                warn!(error = %e, "Could not disable Nagle on hook connection");
            }

            let handler = self.handler.clone();
            let max_message_size = self.config.max_message_size;
            tokio::spawn(async move {
                let connection_id = HookConnectionId::new();
                let span = logging::connection_span(&connection_id);
                logging::log_connection_opened(&connection_id, &peer);
                let outcome = handle_connection(stream, handler, max_message_size, connection_id)
                    .instrument(span)
                    .await;
                match outcome {
                    Ok(answered) => debug!(answered, "Runner disconnected"),
                    // Already reported with the connection id
                    Err(e) => debug!(error = %e, "Connection task ended with error"),
                }
            });
        }

        logging::log_server_shutdown();
        Ok(())
    }
}

/// Serve one runner connection until it closes.
///
/// Returns the number of messages answered, or the error that closed the
/// connection. Both are logged here before returning.
pub async fn handle_connection<S>(
    stream: S,
    handler: HookHandler,
    max_message_size: usize,
    connection_id: HookConnectionId,
) -> HookResult<usize>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let started = Instant::now();
    let (read_half, mut writer) = tokio::io::split(stream);
    let mut reader = BufReader::new(read_half);
    let mut context = HookContext::for_connection(connection_id.clone());
    let mut frame = Vec::new();
    let mut answered = 0;

    let outcome = loop {
        match read_frame(&mut reader, max_message_size, &mut frame).await {
            Ok(true) => {}
            Ok(false) => break Ok(answered),
            Err(e) => break Err(e),
        }
        if frame.iter().all(u8::is_ascii_whitespace) {
            continue;
        }

        let reply = match handler.handle_frame(&frame, &mut context) {
            Ok(reply) => reply,
            Err(e) if e.is_recoverable() => {
                logging::log_parse_error(&e.to_string(), &String::from_utf8_lossy(&frame));
                continue;
            }
            Err(e) => break Err(e),
        };

        if let Err(e) = write_frame(&mut writer, &reply).await {
            break Err(e);
        }
        answered += 1;
    };

    if let Err(e) = &outcome {
        logging::log_connection_error(&connection_id, &e.to_string());
    }
    logging::log_connection_closed(&connection_id, answered, started.elapsed());
    outcome
}
