//! Request fields and per-request context.
//!
//! Transports flatten whatever they receive (query strings, form bodies, JSON
//! lines) into a [`RequestArgs`] mapping. Absent fields and explicit `null`
//! values are indistinguishable to the dispatcher: both mean "not supplied".

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Field carrying the requested action name.
pub const ACTION_FIELD: &str = "action";
/// Field carrying the client's protocol version.
pub const PROTOCOL_FIELD: &str = "protocol";
/// Field carrying the absolute-style collection path.
pub const COLLECTION_FIELD: &str = "collection";
/// Field carrying the document name within the collection.
pub const DOCUMENT_FIELD: &str = "document";

/// Flat mapping of request field names to values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestArgs {
    fields: Map<String, Value>,
}

/// Errors raised while decoding a request line.
#[derive(Debug, Error)]
pub enum RequestParseError {
    /// The line held nothing but whitespace.
    #[error("empty request line")]
    Empty,
    /// The line was not valid JSON.
    #[error("malformed request: {0}")]
    Malformed(#[source] serde_json::Error),
    /// The line was valid JSON but not an object.
    #[error("request must be a JSON object")]
    NotAnObject,
}

impl RequestArgs {
    /// Creates an empty request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a single JSON object line.
    ///
    /// Trailing whitespace, including the newline delimiter, is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`RequestParseError`] when the line is empty, is not valid
    /// JSON, or does not hold an object.
    pub fn parse(line: &[u8]) -> Result<Self, RequestParseError> {
        let trimmed = line.trim_ascii_end();
        if trimmed.is_empty() {
            return Err(RequestParseError::Empty);
        }

        match serde_json::from_slice(trimmed).map_err(RequestParseError::Malformed)? {
            Value::Object(fields) => Ok(Self { fields }),
            _ => Err(RequestParseError::NotAnObject),
        }
    }

    /// Returns the request with `name` set to `value`.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Sets `name` to `value`, replacing any previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Returns the supplied value for `name`, treating `null` as absent.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name).filter(|value| !value.is_null())
    }

    /// The `action` field.
    pub fn action(&self) -> Option<&Value> {
        self.get(ACTION_FIELD)
    }

    /// The `protocol` field.
    pub fn protocol(&self) -> Option<&Value> {
        self.get(PROTOCOL_FIELD)
    }

    /// The `collection` field.
    pub fn collection(&self) -> Option<&Value> {
        self.get(COLLECTION_FIELD)
    }

    /// The `document` field.
    pub fn document(&self) -> Option<&Value> {
        self.get(DOCUMENT_FIELD)
    }

    /// Borrows the underlying mapping, nulls included.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.fields
    }
}

impl From<Map<String, Value>> for RequestArgs {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for RequestArgs {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value))
                .collect(),
        }
    }
}

/// Transport-supplied facts about the client issuing a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    client_ip: Option<String>,
    client_hostname: Option<String>,
    session_id: Option<String>,
}

impl RequestContext {
    /// Creates a context with no client details.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the client's address and resolved hostname.
    #[must_use]
    pub fn with_client(mut self, ip: impl Into<String>, hostname: impl Into<String>) -> Self {
        self.client_ip = Some(ip.into());
        self.client_hostname = Some(hostname.into());
        self
    }

    /// Records the session identifier presented by the client.
    #[must_use]
    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Client address, when known.
    pub fn client_ip(&self) -> Option<&str> {
        self.client_ip.as_deref()
    }

    /// Client hostname, when known.
    pub fn client_hostname(&self) -> Option<&str> {
        self.client_hostname.as_deref()
    }

    /// Session identifier, when the client presented one.
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn parses_object_line() {
        let request = RequestArgs::parse(br#"{"action":"getDocument","protocol":"1"}"#)
            .expect("parse request");
        assert_eq!(request.action(), Some(&json!("getDocument")));
        assert_eq!(request.protocol(), Some(&json!("1")));
    }

    #[test]
    fn trims_trailing_whitespace() {
        let request =
            RequestArgs::parse(b"{\"action\":\"whoami\"}  \r\n").expect("parse with whitespace");
        assert_eq!(request.action(), Some(&json!("whoami")));
    }

    #[test]
    fn rejects_empty_input() {
        assert!(matches!(
            RequestArgs::parse(b"   \n"),
            Err(RequestParseError::Empty)
        ));
    }

    #[test]
    fn rejects_invalid_json() {
        assert!(matches!(
            RequestArgs::parse(b"not json"),
            Err(RequestParseError::Malformed(_))
        ));
    }

    #[test]
    fn rejects_non_object_json() {
        assert!(matches!(
            RequestArgs::parse(b"[1, 2]"),
            Err(RequestParseError::NotAnObject)
        ));
    }

    #[test]
    fn null_fields_read_as_absent() {
        let request = RequestArgs::new()
            .with("collection", Value::Null)
            .with("document", "news-01");
        assert!(request.collection().is_none());
        assert!(request.as_map().contains_key("collection"));
        assert_eq!(request.document(), Some(&json!("news-01")));
    }

    #[test]
    fn context_records_client_details() {
        let context = RequestContext::new()
            .with_client("10.0.0.7", "annotator.example")
            .with_session_id("abc123");
        assert_eq!(context.client_ip(), Some("10.0.0.7"));
        assert_eq!(context.client_hostname(), Some("annotator.example"));
        assert_eq!(context.session_id(), Some("abc123"));
    }
}
