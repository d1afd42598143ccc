//! Handlers the dispatcher provides itself.

use serde_json::{Map, Value};

use super::catalogue::LOG_ANNOTATOR_ACTION;
use super::handler::HandlerResult;
use super::registry::{HandlerBinding, ParamSpec, RegistryBuilder, RegistryError};

/// Accepts a client-side log entry.
///
/// The entry reaches the audit trail through the action's own START/FINISH
/// events, so the handler has nothing to do beyond answering.
fn log_annotator_action(_args: &[Value]) -> HandlerResult {
    Ok(Map::new())
}

/// Binding for `logAnnotatorAction(collection, document, log)`.
pub fn log_annotator_binding() -> HandlerBinding {
    HandlerBinding::positional(
        vec![
            ParamSpec::required("collection"),
            ParamSpec::required("document"),
            ParamSpec::required("log"),
        ],
        log_annotator_action,
    )
}

impl RegistryBuilder {
    /// Registers the built-in actions.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateAction`] if an embedder already
    /// registered a built-in name.
    pub fn with_builtins(&mut self) -> Result<&mut Self, RegistryError> {
        self.register_standard(LOG_ANNOTATOR_ACTION, log_annotator_binding())
    }
}
