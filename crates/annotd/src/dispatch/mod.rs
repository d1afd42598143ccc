//! Action dispatch for annotation server requests.
//!
//! Every client request is a flat JSON object naming an `action` and its
//! arguments. The [`Dispatcher`] takes one request through a fixed pipeline:
//!
//! 1. the security gate checks the protocol version, the presence of an
//!    action, the confinement of `collection` under the data root, and the
//!    caller's session when the action requires one;
//! 2. the action is resolved against the [`ActionRegistry`];
//! 3. positional handlers get their arguments bound from the request, while
//!    expand-style handlers receive the whole request;
//! 4. the handler runs, bracketed by audit events when the action is logged;
//! 5. the result is wrapped with the action name and protocol version.
//!
//! ## Protocol
//!
//! Requests and responses travel as JSONL lines:
//!
//! ```json
//! {"action":"getDocument","protocol":1,"collection":"/news/","document":"doc-1"}
//! ```
//!
//! ```json
//! {"text":"...","comments":[],"action":"getDocument","protocol":1}
//! ```
//!
//! Failures are reported as objects carrying an `exception` tag and a
//! `message`, plus the fields describing the condition:
//!
//! ```json
//! {"action":"bogus","exception":"invalidAction","message":"client sent an invalid action \"bogus\""}
//! ```

mod binder;
mod builtin;
mod catalogue;
mod dispatcher;
mod errors;
mod gate;
mod handler;
mod registry;
mod request;
mod response;

pub use self::builtin::log_annotator_binding;
pub use self::catalogue::{
    InvocationStyle, LOG_ANNOTATOR_ACTION, STANDARD_ACTIONS, StandardAction, standard_action,
};
pub use self::dispatcher::Dispatcher;
pub use self::errors::{DispatchError, PROTOCOL_VERSION, ProtocolError, SubmittedVersion};
pub use self::handler::{
    ExpandHandler, HandlerError, HandlerOutput, HandlerResult, PositionalHandler,
};
pub use self::registry::{
    ActionDescriptor, ActionRegistry, Capabilities, HandlerBinding, ParamSpec, RegistryBuilder,
    RegistryError,
};
pub use self::request::{
    ACTION_FIELD, COLLECTION_FIELD, DOCUMENT_FIELD, PROTOCOL_FIELD, RequestArgs, RequestContext,
    RequestParseError,
};
pub use self::response::{ActionResponse, ResponseWriteError, ResponseWriter};

pub(crate) use self::dispatcher::DISPATCH_TARGET;
