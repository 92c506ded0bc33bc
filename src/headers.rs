//! Case-insensitive header map for transaction records.
//!
//! The test runner hands headers over as a JSON object whose key casing depends
//! on where the record came from (fixture files keep the author's casing, real
//! responses arrive lower-cased). Lookups here ignore ASCII case while the
//! original key spelling is kept for the round trip back to the runner.

use {
    serde::{Deserialize, Deserializer, Serialize, Serializer, ser::SerializeMap},
    serde_json::Value,
    std::collections::BTreeMap,
    std::fmt,
};

/// A single header value as the runner encodes it.
///
/// Most headers are plain strings; `set-cookie` on a real response is an array
/// with one entry per cookie. Anything else (`"Content-Length": 0`, `null`) is
/// carried as `Other` and written back untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HeaderValue {
    Single(String),
    Multiple(Vec<String>),
    Other(Value),
}

impl HeaderValue {
    /// The value as a string, if it is single-valued.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Single(value) => Some(value),
            Self::Multiple(_) | Self::Other(_) => None,
        }
    }

    /// Whether the value is exactly `expected`.
    ///
    /// A multi-valued header matches when it has one entry equal to `expected`.
    pub fn is(&self, expected: &str) -> bool {
        match self {
            Self::Single(value) => value == expected,
            Self::Multiple(values) => values.len() == 1 && values[0] == expected,
            Self::Other(_) => false,
        }
    }
}

impl From<&str> for HeaderValue {
    fn from(value: &str) -> Self {
        Self::Single(value.to_string())
    }
}

impl From<String> for HeaderValue {
    fn from(value: String) -> Self {
        Self::Single(value)
    }
}

impl From<Vec<String>> for HeaderValue {
    fn from(values: Vec<String>) -> Self {
        Self::Multiple(values)
    }
}

impl fmt::Display for HeaderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(value) => write!(f, "{value}"),
            Self::Multiple(values) => write!(f, "{}", values.join(", ")),
            Self::Other(value) => write!(f, "{value}"),
        }
    }
}

/// Header map with case-insensitive names and insertion order preserved.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeaderMap {
    entries: Vec<(String, HeaderValue)>,
}

impl HeaderMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a header, ignoring the case of `name`.
    pub fn get(&self, name: &str) -> Option<&HeaderValue> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    }

    /// Set a header, replacing every entry whose name matches `name` in any
    /// casing. The new entry is stored under `name` as given.
    pub fn insert(&mut self, name: &str, value: impl Into<HeaderValue>) {
        self.entries.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.entries.push((name.to_string(), value.into()));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &HeaderValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<HeaderValue>> FromIterator<(K, V)> for HeaderMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl Serialize for HeaderMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for HeaderMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // JSON object keys are unique byte-for-byte, so entries differing only
        // in case survive side by side; `get` returns the first one.
        let raw = BTreeMap::<String, HeaderValue>::deserialize(deserializer)?;
        Ok(raw.into_iter().collect())
    }
}
