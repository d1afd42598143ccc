//! Security gate run before any handler is resolved.
//!
//! The checks run in a fixed order and stop at the first failure:
//!
//! 1. protocol version (lenient: unparseable values pass),
//! 2. action presence,
//! 3. collection path confinement under the data root,
//! 4. authentication for actions that require it.
//!
//! Authentication is decided from the registry's capability flags before the
//! action is resolved, so an unauthenticated client learns nothing about
//! which guarded names exist beyond the authentication failure itself.

use annotd_config::DataRoot;
use serde_json::Value;
use tracing::info;

use super::dispatcher::DISPATCH_TARGET;
use super::errors::{DispatchError, PROTOCOL_VERSION, ProtocolError, SubmittedVersion};
use super::registry::ActionRegistry;
use super::request::{RequestArgs, RequestContext};
use crate::session::SessionProvider;

/// Ordered, short-circuiting request checks.
pub(crate) struct SecurityGate<'a> {
    registry: &'a ActionRegistry,
    data_root: &'a DataRoot,
    sessions: &'a dyn SessionProvider,
}

impl<'a> SecurityGate<'a> {
    pub(crate) fn new(
        registry: &'a ActionRegistry,
        data_root: &'a DataRoot,
        sessions: &'a dyn SessionProvider,
    ) -> Self {
        Self {
            registry,
            data_root,
            sessions,
        }
    }

    /// Runs every check and returns the requested action name.
    pub(crate) fn inspect<'r>(
        &self,
        args: &'r RequestArgs,
        context: &RequestContext,
    ) -> Result<&'r str, DispatchError> {
        check_protocol(args)?;
        let action = require_action(args)?;
        check_collection(args, self.data_root)?;
        self.check_authentication(action, context)?;
        Ok(action)
    }

    fn check_authentication(
        &self,
        action: &str,
        context: &RequestContext,
    ) -> Result<(), DispatchError> {
        if !self.registry.requires_auth(action) {
            return Ok(());
        }

        let authenticated = self
            .sessions
            .session(context)
            .is_some_and(|session| session.user().is_some());
        if authenticated {
            return Ok(());
        }

        info!(
            target: DISPATCH_TARGET,
            action,
            client_ip = context.client_ip().unwrap_or("-"),
            client_hostname = context.client_hostname().unwrap_or("-"),
            "authorisation failure"
        );
        Err(DispatchError::not_authorised(action))
    }
}

/// Rejects integer protocol versions other than [`PROTOCOL_VERSION`].
///
/// JSON numbers are truncated toward zero; strings must hold integer text.
pub(crate) fn check_protocol(args: &RequestArgs) -> Result<(), ProtocolError> {
    match args.protocol().and_then(submitted_version) {
        Some(submitted) if !submitted.is(PROTOCOL_VERSION) => {
            Err(ProtocolError::version_mismatch(submitted))
        }
        _ => Ok(()),
    }
}

fn submitted_version(value: &Value) -> Option<SubmittedVersion> {
    match value {
        Value::Number(number) => SubmittedVersion::from_number(number),
        Value::String(text) => SubmittedVersion::parse(text),
        _ => None,
    }
}

/// Returns the action name, failing when none was sent.
///
/// A non-string `action` can never name a registered action, so it is
/// reported as invalid straight away using its JSON rendering.
pub(crate) fn require_action(args: &RequestArgs) -> Result<&str, ProtocolError> {
    match args.action() {
        None => Err(ProtocolError::NoAction),
        Some(Value::String(name)) => Ok(name.as_str()),
        Some(other) => Err(ProtocolError::invalid_action(other.to_string())),
    }
}

/// Confines the `collection` field to the data root.
pub(crate) fn check_collection(
    args: &RequestArgs,
    data_root: &DataRoot,
) -> Result<(), ProtocolError> {
    let Some(value) = args.collection() else {
        return Ok(());
    };
    let Value::String(requested) = value else {
        return Err(ProtocolError::path_security(value.to_string()));
    };
    if collection_is_safe(requested, data_root) {
        Ok(())
    } else {
        Err(ProtocolError::path_security(requested.as_str()))
    }
}

fn collection_is_safe(requested: &str, data_root: &DataRoot) -> bool {
    let Some(relative) = requested.strip_prefix('/') else {
        return false;
    };
    data_root.contains(&data_root.resolve(relative))
}
