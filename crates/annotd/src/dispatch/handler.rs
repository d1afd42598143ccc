//! Handler traits implemented by action operations.
//!
//! Handlers come in two shapes. Expand handlers receive the whole request
//! mapping and interpret the fields themselves. Positional handlers receive
//! the values of their declared parameters, in declaration order, after the
//! dispatcher has applied defaults. Closures with the matching signature
//! implement both traits, so most registrations never name a type.

use serde_json::{Map, Value};
use thiserror::Error;

use super::request::RequestArgs;

/// Object returned by a successful handler.
pub type HandlerOutput = Map<String, Value>;

/// Result of invoking a handler.
pub type HandlerResult = Result<HandlerOutput, HandlerError>;

/// Handler that receives the entire request mapping.
pub trait ExpandHandler: Send + Sync {
    /// Runs the operation against the raw request.
    ///
    /// # Errors
    ///
    /// Returns a [`HandlerError`] describing the failure; the dispatcher
    /// passes it to the client unchanged.
    fn call(&self, args: &RequestArgs) -> HandlerResult;
}

impl<F> ExpandHandler for F
where
    F: Fn(&RequestArgs) -> HandlerResult + Send + Sync,
{
    fn call(&self, args: &RequestArgs) -> HandlerResult {
        self(args)
    }
}

/// Handler that receives bound positional arguments.
pub trait PositionalHandler: Send + Sync {
    /// Runs the operation with one value per declared parameter.
    ///
    /// # Errors
    ///
    /// Returns a [`HandlerError`] describing the failure; the dispatcher
    /// passes it to the client unchanged.
    fn call(&self, args: &[Value]) -> HandlerResult;
}

impl<F> PositionalHandler for F
where
    F: Fn(&[Value]) -> HandlerResult + Send + Sync,
{
    fn call(&self, args: &[Value]) -> HandlerResult {
        self(args)
    }
}

/// Failure raised by an action handler.
///
/// The `exception` tag and any extra fields are forwarded to the client as
/// they are, so handlers own the shape of their own error responses.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct HandlerError {
    exception: String,
    message: String,
    fields: Map<String, Value>,
}

impl HandlerError {
    /// Creates a handler error with a wire tag and human-readable message.
    pub fn new(exception: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            exception: exception.into(),
            message: message.into(),
            fields: Map::new(),
        }
    }

    /// Attaches an extra field to the error response.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: Value) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    /// Wire tag identifying the failure.
    pub fn exception(&self) -> &str {
        &self.exception
    }

    /// Human-readable description.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Extra fields forwarded to the client.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}
