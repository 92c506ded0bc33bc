//! Test helpers for integration tests
//!
//! Starts a hook server on a dynamic port and plays the test runner's side of
//! the hook protocol against it.

#![allow(dead_code)]

use serde_json::{json, Value};
use session_hooks::{HookServer, HookServerConfig};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::time::timeout;

pub const INIT_XML: &str = "REST API after init > Initialize > Initialize from XML topology";
pub const INIT_DISK: &str = "REST API after init > Initialize > Initialize from data on disk";

const REPLY_TIMEOUT: Duration = Duration::from_secs(5);

/// A hook server running on a dynamic port
pub struct TestServer {
    pub addr: SocketAddr,
    pub handle: tokio::task::JoinHandle<anyhow::Result<()>>,
}

impl TestServer {
    /// Start a session-carrying server for `init_transactions`
    pub async fn start(init_transactions: &[&str]) -> Self {
        Self::start_with(Self::config(init_transactions)).await
    }

    pub fn config(init_transactions: &[&str]) -> HookServerConfig {
        HookServerConfig {
            port: 0,
            ..HookServerConfig::default()
        }
        .with_init_transactions(init_transactions.iter().copied())
    }

    pub async fn start_with(config: HookServerConfig) -> Self {
        let (handle, addr) = HookServer::session_carrying(config)
            .start_dynamic()
            .await
            .expect("Failed to start hook server on dynamic port");
        TestServer { addr, handle }
    }

    /// Connect as a test runner
    pub async fn connect(&self) -> RunnerClient {
        let stream = TcpStream::connect(self.addr)
            .await
            .expect("Failed to connect to hook server");
        let (read, write) = stream.into_split();
        RunnerClient {
            reader: BufReader::new(read),
            writer: write,
            next_uuid: 0,
        }
    }

    pub async fn stop(self) {
        self.handle.abort();
        let _ = self.handle.await;
    }
}

/// Runner side of one hook connection
pub struct RunnerClient {
    reader: BufReader<OwnedReadHalf>,
    pub writer: OwnedWriteHalf,
    next_uuid: u32,
}

impl RunnerClient {
    /// Send one event and wait for its reply, returning the reply's `data`
    pub async fn send(&mut self, event: &str, data: Value) -> Value {
        self.next_uuid += 1;
        let uuid = format!("uuid-{}", self.next_uuid);
        let message = json!({"uuid": uuid, "event": event, "data": data});
        self.send_raw(&message.to_string()).await;

        let reply = self.read_reply().await.expect("Connection closed before reply");
        assert_eq!(reply["uuid"], uuid.as_str(), "reply uuid mismatch");
        assert_eq!(reply["event"], event, "reply event mismatch");
        reply["data"].clone()
    }

    /// Write a raw line, delimiter appended
    pub async fn send_raw(&mut self, line: &str) {
        self.writer
            .write_all(format!("{line}\n").as_bytes())
            .await
            .expect("Failed to write message");
    }

    /// Read the next reply, `None` once the server closed the connection
    pub async fn read_reply(&mut self) -> Option<Value> {
        let mut line = String::new();
        let read = timeout(REPLY_TIMEOUT, self.reader.read_line(&mut line))
            .await
            .expect("Timeout waiting for hook reply");
        match read {
            // A reset counts as closed: the server may drop unread input
            Ok(0) | Err(_) => None,
            Ok(_) => Some(serde_json::from_str(line.trim_end()).expect("Reply is not JSON")),
        }
    }

    /// Play the per-transaction event sequence; returns the request as sent.
    pub async fn run_transaction(&mut self, name: &str, real_headers: Value, real_body: &str) -> Value {
        let sent = self.send("beforeEach", transaction(name)).await;

        let mut received = sent.clone();
        received["real"] = json!({"statusCode": 200, "headers": real_headers, "body": real_body});
        let validated = self.send("beforeEachValidation", received).await;
        self.send("afterEach", validated).await;

        sent
    }
}

/// A runner transaction as sent with `beforeEach`
pub fn transaction(name: &str) -> Value {
    json!({
        "name": name,
        "id": format!("GET (200) {name}"),
        "host": "127.0.0.1",
        "port": "8080",
        "protocol": "http:",
        "fullPath": "/cybercaptor-server/rest/json",
        "skip": false,
        "request": {"method": "GET", "uri": "/cybercaptor-server/rest/json", "headers": {"Accept": "application/json"}, "body": ""},
        "expected": {"statusCode": "200", "headers": {"Content-Type": "application/json"}, "body": "{}"}
    })
}
