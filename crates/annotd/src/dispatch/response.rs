//! Response envelope and JSONL serialisation.
//!
//! Handler output is wrapped with the performed action and the protocol
//! version before it leaves the dispatcher. Positional results are also
//! scrubbed of internal annotation fields.

use std::io::{self, Write};

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use super::errors::{DispatchError, PROTOCOL_VERSION};
use super::handler::HandlerOutput;
use super::request::{ACTION_FIELD, PROTOCOL_FIELD, RequestParseError};

const COMMENTS_FIELD: &str = "comments";
const ANNOTATIONS_FIELD: &str = "annotations";
const SENTENCE_OFFSETS_FIELD: &str = "sentence_offsets";

/// Successful response sent back to the client.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ActionResponse {
    fields: Map<String, Value>,
}

impl ActionResponse {
    /// Wraps the result of an expand-style handler.
    pub(crate) fn from_expand(mut fields: HandlerOutput, action: &str) -> Self {
        fields.insert(ACTION_FIELD.to_owned(), Value::from(action));
        fields.insert(PROTOCOL_FIELD.to_owned(), Value::from(PROTOCOL_VERSION));
        fields.insert(COMMENTS_FIELD.to_owned(), Value::Array(Vec::new()));
        Self { fields }
    }

    /// Wraps the result of a positional handler.
    ///
    /// Handler-produced `comments` are discarded, and nested `annotations`
    /// lose their comments and internal sentence offsets.
    pub(crate) fn from_positional(mut fields: HandlerOutput, action: &str) -> Self {
        fields.insert(COMMENTS_FIELD.to_owned(), Value::Array(Vec::new()));
        if let Some(Value::Object(annotations)) = fields.get_mut(ANNOTATIONS_FIELD) {
            annotations.insert(COMMENTS_FIELD.to_owned(), Value::Array(Vec::new()));
            annotations.remove(SENTENCE_OFFSETS_FIELD);
        }
        fields.insert(ACTION_FIELD.to_owned(), Value::from(action));
        fields.insert(PROTOCOL_FIELD.to_owned(), Value::from(PROTOCOL_VERSION));
        Self { fields }
    }

    /// Returns a response field.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Borrows the response mapping.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Consumes the response, returning the mapping.
    pub fn into_map(self) -> Map<String, Value> {
        self.fields
    }
}

/// Failures while writing a response to the transport.
#[derive(Debug, Error)]
pub enum ResponseWriteError {
    /// IO error during write or flush.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// Response serialisation failed.
    #[error("failed to serialise response: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Writer that frames responses as JSONL lines.
pub struct ResponseWriter<W> {
    writer: W,
}

impl<W: Write> ResponseWriter<W> {
    /// Creates a new response writer wrapping the given output stream.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Writes a successful response line and flushes.
    ///
    /// # Errors
    ///
    /// Returns an error if serialisation or writing fails.
    pub fn write_response(&mut self, response: &ActionResponse) -> Result<(), ResponseWriteError> {
        self.write_line(response)
    }

    /// Writes the tagged error object for `error` and flushes.
    ///
    /// # Errors
    ///
    /// Returns an error if serialisation or writing fails.
    pub fn write_error(&mut self, error: &DispatchError) -> Result<(), ResponseWriteError> {
        self.write_line(&error.response_fragment())
    }

    /// Writes a `malformedRequest` error for an undecodable request line.
    ///
    /// # Errors
    ///
    /// Returns an error if serialisation or writing fails.
    pub fn write_parse_error(
        &mut self,
        error: &RequestParseError,
    ) -> Result<(), ResponseWriteError> {
        let mut fragment = Map::new();
        fragment.insert("exception".to_owned(), Value::from("malformedRequest"));
        fragment.insert("message".to_owned(), Value::from(error.to_string()));
        self.write_line(&fragment)
    }

    fn write_line<T: Serialize + ?Sized>(&mut self, message: &T) -> Result<(), ResponseWriteError> {
        serde_json::to_writer(&mut self.writer, message)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}
