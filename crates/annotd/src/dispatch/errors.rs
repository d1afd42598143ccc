//! Error types for request dispatch failures.
//!
//! Protocol violations detected by the dispatcher form a closed set of
//! variants under [`ProtocolError`]. Authentication failures and handler
//! failures sit beside them in [`DispatchError`]. A single pure function,
//! [`DispatchError::response_fragment`], maps any variant to the tagged object
//! a transport sends back to the client.

use std::fmt;

use serde_json::{Map, Number, Value, json};
use thiserror::Error;

use super::handler::HandlerError;

/// Protocol version spoken by this server.
pub const PROTOCOL_VERSION: i64 = 1;

/// Integer protocol version as submitted by a client.
///
/// Holds canonical decimal digits so versions beyond the range of any
/// machine integer are still reported exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedVersion(String);

impl SubmittedVersion {
    /// Reads an integer version from a JSON number.
    ///
    /// Fractional numbers are truncated toward zero.
    pub fn from_number(number: &Number) -> Option<Self> {
        if let Some(value) = number.as_i64() {
            return Some(Self::from(value));
        }
        if let Some(value) = number.as_u64() {
            return Some(Self(value.to_string()));
        }
        let value = number.as_f64()?.trunc();
        if !value.is_finite() {
            return None;
        }
        Self::from_digits(&format!("{value:.0}"))
    }

    /// Reads an integer version from text such as `" 2 "` or `"-3"`.
    ///
    /// Returns `None` unless the trimmed text is an optionally signed run of
    /// ASCII digits.
    pub fn parse(text: &str) -> Option<Self> {
        Self::from_digits(text.trim())
    }

    fn from_digits(text: &str) -> Option<Self> {
        let (negative, digits) = match text.as_bytes().first() {
            Some(b'-') => (true, &text[1..]),
            Some(b'+') => (false, &text[1..]),
            _ => (false, text),
        };
        if digits.is_empty() || !digits.bytes().all(|byte| byte.is_ascii_digit()) {
            return None;
        }
        let magnitude = digits.trim_start_matches('0');
        Some(match (negative, magnitude) {
            (_, "") => Self("0".to_owned()),
            (true, _) => Self(format!("-{magnitude}")),
            (false, _) => Self(magnitude.to_owned()),
        })
    }

    /// Whether this names `version`.
    pub fn is(&self, version: i64) -> bool {
        self.0 == version.to_string()
    }

    /// The version as a JSON value: a number when it fits, digits otherwise.
    pub fn to_value(&self) -> Value {
        if let Ok(value) = self.0.parse::<i64>() {
            return Value::from(value);
        }
        if let Ok(value) = self.0.parse::<u64>() {
            return Value::from(value);
        }
        Value::from(self.0.as_str())
    }
}

impl From<i64> for SubmittedVersion {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for SubmittedVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Violations of the request protocol.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// The request carried no `action` field.
    #[error("client sent no action for request")]
    NoAction,

    /// The requested action is not registered.
    #[error("client sent an invalid action \"{attempted}\"")]
    InvalidAction { attempted: String },

    /// A required parameter was absent or null.
    #[error("client did not supply argument \"{argument}\" for action \"{action}\"")]
    MissingArgument { action: String, argument: String },

    /// The collection path escapes the data root or is not absolute-style.
    #[error("client sent request for bad directory: {requested}")]
    PathSecurity { requested: String },

    /// The client speaks a different protocol version.
    #[error(
        "client-server mismatch, please reload the page to update your client; \
         client sent request with version \"{submitted}\", server is using version {expected}"
    )]
    ProtocolVersionMismatch {
        submitted: SubmittedVersion,
        expected: i64,
    },
}

impl ProtocolError {
    /// Creates an invalid action error.
    pub fn invalid_action(attempted: impl Into<String>) -> Self {
        Self::InvalidAction {
            attempted: attempted.into(),
        }
    }

    /// Creates a missing argument error.
    pub fn missing_argument(action: impl Into<String>, argument: impl Into<String>) -> Self {
        Self::MissingArgument {
            action: action.into(),
            argument: argument.into(),
        }
    }

    /// Creates a path security error carrying the raw requested value.
    pub fn path_security(requested: impl Into<String>) -> Self {
        Self::PathSecurity {
            requested: requested.into(),
        }
    }

    /// Creates a version mismatch error against [`PROTOCOL_VERSION`].
    pub fn version_mismatch(submitted: impl Into<SubmittedVersion>) -> Self {
        Self::ProtocolVersionMismatch {
            submitted: submitted.into(),
            expected: PROTOCOL_VERSION,
        }
    }

    /// Stable tag identifying the condition on the wire.
    pub fn exception(&self) -> &'static str {
        match self {
            Self::NoAction => "noAction",
            Self::InvalidAction { .. } => "invalidAction",
            Self::MissingArgument { .. } => "invalidActionArgs",
            Self::PathSecurity { .. } => "directorySecurity",
            Self::ProtocolVersionMismatch { .. } => "protocolVersionMismatch",
        }
    }

    fn fields(&self) -> Map<String, Value> {
        let fields = match self {
            Self::NoAction => json!({}),
            Self::InvalidAction { attempted } => json!({ "action": attempted }),
            Self::MissingArgument { action, argument } => {
                json!({ "action": action, "argument": argument })
            }
            Self::PathSecurity { requested } => json!({ "requested": requested }),
            Self::ProtocolVersionMismatch {
                submitted,
                expected,
            } => json!({ "submitted": submitted.to_value(), "expected": expected }),
        };
        match fields {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }
}

/// Errors surfaced by [`Dispatcher::dispatch`](super::Dispatcher::dispatch).
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The request violated the protocol.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The action requires an authenticated session and none was found.
    #[error("action \"{action}\" requires an authenticated session")]
    NotAuthorised { action: String },

    /// The handler failed; its error is passed through untouched.
    #[error(transparent)]
    Handler(#[from] HandlerError),
}

impl DispatchError {
    /// Creates a not-authorised error.
    pub fn not_authorised(action: impl Into<String>) -> Self {
        Self::NotAuthorised {
            action: action.into(),
        }
    }

    /// Stable tag identifying the condition on the wire.
    pub fn exception(&self) -> &str {
        match self {
            Self::Protocol(error) => error.exception(),
            Self::NotAuthorised { .. } => "notAuthorised",
            Self::Handler(error) => error.exception(),
        }
    }

    /// Returns the protocol violation, if this is one.
    pub fn as_protocol(&self) -> Option<&ProtocolError> {
        match self {
            Self::Protocol(error) => Some(error),
            Self::NotAuthorised { .. } | Self::Handler(_) => None,
        }
    }

    /// Maps the error to the object sent back to the client.
    ///
    /// The object always carries `exception` and `message`; condition fields
    /// are added beside them. Handler-supplied fields never override either
    /// of the two reserved keys.
    pub fn response_fragment(&self) -> Map<String, Value> {
        let mut fragment = match self {
            Self::Protocol(error) => error.fields(),
            Self::NotAuthorised { action } => {
                let mut fields = Map::new();
                fields.insert("action".to_owned(), Value::from(action.as_str()));
                fields
            }
            Self::Handler(error) => error.fields().clone(),
        };
        fragment.insert("exception".to_owned(), Value::from(self.exception()));
        fragment.insert("message".to_owned(), Value::from(self.to_string()));
        fragment
    }
}
