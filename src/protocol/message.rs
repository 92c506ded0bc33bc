//! Hook protocol messages
//!
//! The `data` field is kept as raw JSON until the event is known, so it is
//! parsed exactly once into the shape that event carries, and echoed back
//! byte-for-byte when the event is not one we handle.

use {
    crate::{
        error::{HookError, HookResult},
        transaction::Transaction,
    },
    serde::{Deserialize, Serialize},
    serde_json::value::RawValue,
    std::{fmt, str::FromStr},
};

/// Lifecycle events the runner sends to a hook handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HookEvent {
    BeforeAll,
    BeforeEach,
    BeforeEachValidation,
    AfterEach,
    AfterAll,
}

impl HookEvent {
    pub const ALL: [HookEvent; 5] = [
        HookEvent::BeforeAll,
        HookEvent::BeforeEach,
        HookEvent::BeforeEachValidation,
        HookEvent::AfterEach,
        HookEvent::AfterAll,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HookEvent::BeforeAll => "beforeAll",
            HookEvent::BeforeEach => "beforeEach",
            HookEvent::BeforeEachValidation => "beforeEachValidation",
            HookEvent::AfterEach => "afterEach",
            HookEvent::AfterAll => "afterAll",
        }
    }

    /// `beforeAll` and `afterAll` carry the full transaction list.
    pub fn is_batch(&self) -> bool {
        matches!(self, HookEvent::BeforeAll | HookEvent::AfterAll)
    }
}

impl fmt::Display for HookEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HookEvent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HookEvent::ALL
            .into_iter()
            .find(|event| event.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}

/// Message as read off the wire, with `data` not yet parsed.
#[derive(Debug, Deserialize)]
pub struct RawHookMessage<'a> {
    pub uuid: String,
    pub event: String,
    #[serde(borrow)]
    pub data: &'a RawValue,
}

/// Typed `data` of a known event.
#[derive(Debug, Clone, PartialEq)]
pub enum HookPayload {
    Single(Transaction),
    Batch(Vec<Transaction>),
}

impl HookPayload {
    pub fn len(&self) -> usize {
        match self {
            HookPayload::Single(_) => 1,
            HookPayload::Batch(transactions) => transactions.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Serialize for HookPayload {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            HookPayload::Single(transaction) => transaction.serialize(serializer),
            HookPayload::Batch(transactions) => transactions.serialize(serializer),
        }
    }
}

/// Reply sent back to the runner: same `uuid` and `event`, updated `data`.
#[derive(Debug, Serialize)]
pub struct HookReply<'a, T: Serialize> {
    pub uuid: &'a str,
    pub event: &'a str,
    pub data: T,
}

impl<'a> RawHookMessage<'a> {
    pub fn from_slice(bytes: &'a [u8]) -> HookResult<Self> {
        serde_json::from_slice(bytes).map_err(HookError::Json)
    }

    /// The event, or `None` for events this handler does not know.
    pub fn event_kind(&self) -> Option<HookEvent> {
        self.event.parse().ok()
    }

    /// Parse `data` into the shape `event` carries.
    pub fn parse_payload(&self, event: HookEvent) -> HookResult<HookPayload> {
        let invalid = |e: serde_json::Error| HookError::InvalidPayload {
            event: event.to_string(),
            reason: e.to_string(),
        };
        if event.is_batch() {
            serde_json::from_str(self.data.get())
                .map(HookPayload::Batch)
                .map_err(invalid)
        } else {
            serde_json::from_str(self.data.get())
                .map(HookPayload::Single)
                .map_err(invalid)
        }
    }

    /// Serialize a reply to this message carrying `data`.
    pub fn reply<T: Serialize>(&self, data: T) -> HookResult<Vec<u8>> {
        let reply = HookReply {
            uuid: &self.uuid,
            event: &self.event,
            data,
        };
        serde_json::to_vec(&reply).map_err(HookError::Json)
    }

    /// Serialize a reply that returns `data` exactly as received.
    pub fn echo(&self) -> HookResult<Vec<u8>> {
        self.reply(self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn test_event_names() {
        for event in HookEvent::ALL {
            let json = serde_json::to_value(event).unwrap();
            assert_eq!(json, Value::from(event.as_str()));
            assert_eq!(event.as_str().parse::<HookEvent>(), Ok(event));
        }
        assert!("beforeValidation".parse::<HookEvent>().is_err());
    }

    #[test]
    fn test_single_payload_parsing() {
        let msg = r#"{"uuid":"1234-abcd","event":"beforeEach","data":{"name":"Hosts > List","request":{"headers":{}}}}"#;
        let raw = RawHookMessage::from_slice(msg.as_bytes()).unwrap();

        assert_eq!(raw.uuid, "1234-abcd");
        assert_eq!(raw.event_kind(), Some(HookEvent::BeforeEach));

        match raw.parse_payload(HookEvent::BeforeEach).unwrap() {
            HookPayload::Single(transaction) => assert_eq!(transaction.name(), "Hosts > List"),
            other => panic!("Expected single transaction, got {other:?}"),
        }
    }

    #[test]
    fn test_batch_payload_parsing() {
        let msg = r#"{"uuid":"u","event":"beforeAll","data":[{"name":"a"},{"name":"b"}]}"#;
        let raw = RawHookMessage::from_slice(msg.as_bytes()).unwrap();

        let payload = raw.parse_payload(HookEvent::BeforeAll).unwrap();
        assert_eq!(payload.len(), 2);
    }

    #[test]
    fn test_wrong_shape_is_invalid_payload() {
        let msg = r#"{"uuid":"u","event":"afterAll","data":{"name":"a"}}"#;
        let raw = RawHookMessage::from_slice(msg.as_bytes()).unwrap();

        let result = raw.parse_payload(HookEvent::AfterAll);
        assert!(matches!(result, Err(HookError::InvalidPayload { ref event, .. }) if event == "afterAll"));
    }

    #[test]
    fn test_missing_data_is_json_error() {
        let msg = r#"{"uuid":"u","event":"beforeEach"}"#;
        assert!(matches!(
            RawHookMessage::from_slice(msg.as_bytes()),
            Err(HookError::Json(_))
        ));
    }

    #[test]
    fn test_unknown_event_echo() {
        let msg = r#"{"uuid":"u","event":"somethingNew","data":{"keep":[1, 2, 3]}}"#;
        let raw = RawHookMessage::from_slice(msg.as_bytes()).unwrap();

        assert_eq!(raw.event_kind(), None);
        let echoed: Value = serde_json::from_slice(&raw.echo().unwrap()).unwrap();
        assert_eq!(
            echoed,
            json!({"uuid": "u", "event": "somethingNew", "data": {"keep": [1, 2, 3]}})
        );
    }
}
