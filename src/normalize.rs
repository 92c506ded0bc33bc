//! Whitespace-insensitive body normalization.
//!
//! Fixture bodies are usually pretty-printed while servers emit compact XML.
//! Comparing both sides with every whitespace character removed makes
//! indentation and line breaks irrelevant to the verdict.

use crate::headers::HeaderMap;

pub const XML_CONTENT_TYPE: &str = "application/xml";

/// Remove every whitespace character from `body`.
pub fn strip_whitespace(body: &str) -> String {
    body.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Whether `headers` declare an XML body.
///
/// The header name is matched in any casing; the value must be exactly
/// `application/xml`, so `application/xml; charset=utf-8` does not count.
pub fn declares_xml(headers: &HeaderMap) -> bool {
    headers
        .get(crate::transaction::CONTENT_TYPE)
        .is_some_and(|value| value.is(XML_CONTENT_TYPE))
}

/// Strip whitespace from `body` in place when `headers` declare XML.
///
/// Returns whether the body changed.
pub fn normalize_xml_body(headers: &HeaderMap, body: &mut Option<String>) -> bool {
    if !declares_xml(headers) {
        return false;
    }
    match body {
        Some(text) => {
            let stripped = strip_whitespace(text);
            if stripped.len() == text.len() {
                return false;
            }
            *text = stripped;
            true
        }
        None => false,
    }
}
