//! Hook Handler Tests
//!
//! Cross-module tests driving whole test runs through the handler.


use {
    crate::{
        handler::HookHandler,
        session::HookContext,
    },
    serde_json::{json, Value},
};

pub const INIT_XML: &str = "REST API after init > Initialize > Initialize from XML topology";
pub const INIT_DISK: &str = "REST API after init > Initialize > Initialize from data on disk";

/// Send one message through `handler` and return the parsed reply.
pub fn exchange(handler: &HookHandler, context: &mut HookContext, event: &str, data: Value) -> Value {
    let message = json!({"uuid": "test-uuid", "event": event, "data": data});
    let frame = serde_json::to_vec(&message).expect("serialize message");
    let reply = handler.handle_frame(&frame, context).expect("handle frame");
    let reply: Value = serde_json::from_slice(&reply).expect("parse reply");
    assert_eq!(reply["uuid"], "test-uuid");
    reply["data"].clone()
}

/// A runner transaction with the given name and request headers.
pub fn transaction(name: &str, request_headers: Value) -> Value {
    json!({
        "name": name,
        "id": format!("GET (200) {name}"),
        "request": {"method": "GET", "uri": "/", "headers": request_headers, "body": ""},
        "expected": {"statusCode": "200", "headers": {"Content-Type": "application/json"}, "body": "{}"},
    })
}

/// The same transaction after the response arrived.
pub fn completed(name: &str, real_headers: Value, real_body: &str) -> Value {
    let mut data = transaction(name, json!({}));
    data["real"] = json!({"statusCode": 200, "headers": real_headers, "body": real_body});
    data
}
