//! Request dispatch: gate, resolve, bind, invoke, wrap.

use std::io::Write;
use std::sync::Arc;

use annotd_config::DataRoot;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::binder::bind_positional;
use super::errors::DispatchError;
use super::gate::SecurityGate;
use super::handler::{HandlerOutput, HandlerResult};
use super::registry::{ActionDescriptor, ActionRegistry, HandlerBinding};
use super::request::{RequestArgs, RequestContext};
use super::response::{ActionResponse, ResponseWriteError, ResponseWriter};
use crate::audit::{AuditBracket, AuditOutcome, AuditSink};
use crate::session::SessionProvider;

/// Tracing target for dispatch operations.
pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");

/// Single entry point for every action request.
///
/// The dispatcher is immutable once built and may be shared across threads;
/// each call to [`Dispatcher::dispatch`] runs to completion synchronously.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<ActionRegistry>,
    data_root: DataRoot,
    sessions: Arc<dyn SessionProvider>,
    audit: Arc<dyn AuditSink>,
    audit_enabled: bool,
}

impl Dispatcher {
    /// Creates a dispatcher with audit events enabled.
    pub fn new(
        registry: Arc<ActionRegistry>,
        data_root: DataRoot,
        sessions: Arc<dyn SessionProvider>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            registry,
            data_root,
            sessions,
            audit,
            audit_enabled: true,
        }
    }

    /// Enables or disables audit events for logged actions.
    #[must_use]
    pub fn with_audit_enabled(mut self, enabled: bool) -> Self {
        self.audit_enabled = enabled;
        self
    }

    /// The registry actions are resolved against.
    pub fn registry(&self) -> &ActionRegistry {
        &self.registry
    }

    /// The root that confines collection paths.
    pub fn data_root(&self) -> &DataRoot {
        &self.data_root
    }

    /// Dispatches one request.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Protocol`] for gate, resolution, and binding
    /// failures, [`DispatchError::NotAuthorised`] when a guarded action lacks
    /// an authenticated session, and [`DispatchError::Handler`] with the
    /// handler's own error when the operation fails.
    pub fn dispatch(
        &self,
        args: &RequestArgs,
        context: &RequestContext,
    ) -> Result<ActionResponse, DispatchError> {
        debug!(
            target: DISPATCH_TARGET,
            action = ?args.action(),
            "dispatcher handling action"
        );

        let gate = SecurityGate::new(&self.registry, &self.data_root, self.sessions.as_ref());
        let action = gate.inspect(args, context)?;

        let descriptor = self.registry.resolve(action).inspect_err(|_| {
            info!(target: DISPATCH_TARGET, action, "invalid action");
        })?;

        match descriptor.binding() {
            HandlerBinding::Expand(handler) => {
                let output = self.invoke(
                    descriptor,
                    args,
                    || vec![Value::Object(args.as_map().clone())],
                    || handler.call(args),
                )?;
                Ok(ActionResponse::from_expand(output, action))
            }
            HandlerBinding::Positional { params, handler } => {
                let bound = bind_positional(action, params, args)?;
                debug!(
                    target: DISPATCH_TARGET,
                    action,
                    arguments = ?bound,
                    "dispatcher will call action"
                );
                let output = self.invoke(descriptor, args, || bound.clone(), || handler.call(&bound))?;
                Ok(ActionResponse::from_positional(output, action))
            }
        }
    }

    /// Decodes one JSONL request, dispatches it, and writes the response line.
    ///
    /// Dispatch failures are written as tagged error objects; only transport
    /// failures are returned.
    ///
    /// # Errors
    ///
    /// Returns [`ResponseWriteError`] if the response cannot be written.
    pub fn dispatch_line<W: Write>(
        &self,
        line: &[u8],
        context: &RequestContext,
        writer: &mut ResponseWriter<W>,
    ) -> Result<(), ResponseWriteError> {
        let args = match RequestArgs::parse(line) {
            Ok(args) => args,
            Err(error) => {
                warn!(target: DISPATCH_TARGET, %error, "malformed request");
                return writer.write_parse_error(&error);
            }
        };

        match self.dispatch(&args, context) {
            Ok(response) => writer.write_response(&response),
            Err(error) => writer.write_error(&error),
        }
    }

    fn invoke(
        &self,
        descriptor: &ActionDescriptor,
        args: &RequestArgs,
        snapshot: impl FnOnce() -> Vec<Value>,
        call: impl FnOnce() -> HandlerResult,
    ) -> Result<HandlerOutput, DispatchError> {
        let bracket = (self.audit_enabled && descriptor.capabilities().is_logged()).then(|| {
            AuditBracket::open(
                self.audit.as_ref(),
                args.collection().cloned(),
                args.document().cloned(),
                descriptor.name(),
                snapshot(),
            )
        });

        let result = call();

        if let Some(bracket) = bracket {
            let outcome = if result.is_ok() {
                AuditOutcome::Success
            } else {
                AuditOutcome::Failure
            };
            bracket.finish(outcome);
        }

        result.map_err(|error| {
            warn!(
                target: DISPATCH_TARGET,
                action = descriptor.name(),
                exception = error.exception(),
                %error,
                "action handler failed"
            );
            DispatchError::Handler(error)
        })
    }
}
