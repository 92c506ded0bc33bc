//! Transaction records as exchanged with the test runner.
//!
//! Only the fields the hooks read or write are typed. Everything else the
//! runner sends (`id`, `origin`, `fullPath`, `statusCode`, `results`, ...) is
//! kept in `extra` so it goes back to the runner exactly as it came in.
//! A typed field the runner left out stays out of the reply, and one it sent
//! as `null` goes back as `null`.

use {
    crate::headers::HeaderMap,
    serde::{Deserialize, Deserializer, Serialize},
    serde_json::{Map, Value},
};

pub const CONTENT_TYPE: &str = "Content-Type";
pub const COOKIE: &str = "Cookie";
pub const SET_COOKIE: &str = "set-cookie";

/// One request/response exchange under test.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Scenario path, e.g. `REST API after init > Initialize > Initialize from XML topology`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default)]
    pub request: Request,

    /// Response declared by the fixture, known before transmission.
    /// `Some(None)` is an explicit `null`.
    #[serde(default, deserialize_with = "explicit_null", skip_serializing_if = "Option::is_none")]
    pub expected: Option<Option<ExpectedResponse>>,

    /// Response actually received, present once the request went out.
    #[serde(default, deserialize_with = "explicit_null", skip_serializing_if = "Option::is_none")]
    pub real: Option<Option<RealResponse>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Outgoing request, mutable while `beforeEach` hooks run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Request {
    #[serde(default)]
    pub headers: HeaderMap,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpectedResponse {
    #[serde(default)]
    pub headers: HeaderMap,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RealResponse {
    #[serde(default)]
    pub headers: HeaderMap,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Only called for fields that are present, so `null` becomes `Some(None)`.
fn explicit_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl Transaction {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_expected(mut self, expected: ExpectedResponse) -> Self {
        self.expected = Some(Some(expected));
        self
    }

    pub fn with_real(mut self, real: RealResponse) -> Self {
        self.real = Some(Some(real));
        self
    }

    /// Scenario path, empty when the runner sent none.
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    pub fn expected(&self) -> Option<&ExpectedResponse> {
        self.expected.as_ref().and_then(Option::as_ref)
    }

    pub fn expected_mut(&mut self) -> Option<&mut ExpectedResponse> {
        self.expected.as_mut().and_then(Option::as_mut)
    }

    pub fn real(&self) -> Option<&RealResponse> {
        self.real.as_ref().and_then(Option::as_ref)
    }

    pub fn real_mut(&mut self) -> Option<&mut RealResponse> {
        self.real.as_mut().and_then(Option::as_mut)
    }
}

macro_rules! response_builders {
    ($ty:ty) => {
        impl $ty {
            pub fn new() -> Self {
                Self::default()
            }

            pub fn with_header(
                mut self,
                name: &str,
                value: impl Into<crate::headers::HeaderValue>,
            ) -> Self {
                self.headers.insert(name, value);
                self
            }

            pub fn with_body(mut self, body: impl Into<String>) -> Self {
                self.body = Some(body.into());
                self
            }
        }
    };
}

response_builders!(Request);
response_builders!(ExpectedResponse);
response_builders!(RealResponse);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn runner_transaction() -> Value {
        json!({
            "name": "REST API after init > Initialize > Initialize from XML topology",
            "id": "POST (200) /initialize",
            "host": "localhost",
            "port": "8080",
            "protocol": "http:",
            "fullPath": "/cybercaptor-server/rest/json/initialize",
            "origin": {"apiName": "REST API", "resourceName": "Initialize"},
            "skip": false,
            "request": {
                "method": "POST",
                "uri": "/cybercaptor-server/rest/json/initialize",
                "headers": {"Content-Type": "application/xml"},
                "body": "<topology/>"
            },
            "expected": {
                "statusCode": "200",
                "headers": {"Content-Type": "application/json"},
                "body": "{}"
            },
            "real": {
                "statusCode": 200,
                "headers": {"set-cookie": ["JSESSIONID=42; Path=/"], "content-type": "application/json"},
                "body": "{}"
            }
        })
    }

    #[test]
    fn test_unknown_fields_round_trip() {
        let original = runner_transaction();
        let transaction: Transaction = serde_json::from_value(original.clone()).unwrap();

        assert_eq!(transaction.request.extra["method"], "POST");
        assert_eq!(transaction.real().unwrap().extra["statusCode"], 200);
        assert_eq!(transaction.extra["origin"]["resourceName"], "Initialize");

        let back = serde_json::to_value(&transaction).unwrap();
        assert_eq!(back, original);
    }

    #[test]
    fn test_minimal_transaction() {
        let transaction: Transaction = serde_json::from_value(json!({"name": "GET /health"})).unwrap();

        assert_eq!(transaction.name(), "GET /health");
        assert!(transaction.request.headers.is_empty());
        assert!(transaction.expected.is_none());
        assert!(transaction.real.is_none());
    }

    #[test]
    fn test_absent_and_null_fields_round_trip() {
        let original = json!({"expected": null, "real": null, "request": {"headers": {}}});
        let transaction: Transaction = serde_json::from_value(original.clone()).unwrap();

        assert_eq!(transaction.name, None);
        assert_eq!(transaction.name(), "");
        assert_eq!(transaction.expected, Some(None));
        assert_eq!(transaction.real, Some(None));
        assert!(transaction.expected().is_none());
        assert!(transaction.real().is_none());

        let back = serde_json::to_value(&transaction).unwrap();
        assert_eq!(back, original);
    }

    #[test]
    fn test_absent_responses_stay_absent() {
        let original = json!({"request": {"headers": {}}});
        let transaction: Transaction = serde_json::from_value(original.clone()).unwrap();

        assert_eq!(transaction.expected, None);
        assert_eq!(serde_json::to_value(&transaction).unwrap(), original);
    }
}
