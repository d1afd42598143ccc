//! Request dispatch core for the annotation server.
//!
//! Every operation the server offers is an *action* reached through a single
//! entry point, [`Dispatcher::dispatch`]. The dispatcher enforces the
//! protocol version, confines collection paths to the configured data root,
//! checks sessions for guarded actions, binds request fields to handler
//! parameters, and wraps results with protocol metadata. Actions flagged as
//! logged are bracketed by audit events that are always closed, whether the
//! handler succeeds, fails, or unwinds.
//!
//! Handlers, the session store, and audit storage are collaborators supplied
//! by the embedder through [`ExpandHandler`], [`PositionalHandler`],
//! [`SessionProvider`], and [`AuditSink`]. The [`bootstrap_with`] sequence
//! loads configuration through [`annotd_config`], installs structured
//! telemetry, and returns a ready [`Dispatcher`].
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use annotd::{
//!     ActionRegistry, NoSessions, StructuredHealthReporter, SystemConfigLoader,
//!     TracingAuditSink, bootstrap_with,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut builder = ActionRegistry::builder();
//! builder.with_builtins()?;
//! let service = bootstrap_with(
//!     &SystemConfigLoader,
//!     Arc::new(StructuredHealthReporter::new()),
//!     builder.build(),
//!     Arc::new(NoSessions),
//!     Arc::new(TracingAuditSink),
//! )?;
//! let _dispatcher = service.into_dispatcher();
//! # Ok(())
//! # }
//! ```

pub mod audit;
mod bootstrap;
pub mod dispatch;
mod health;
pub mod session;
mod stdio;
pub mod telemetry;

pub use audit::{AuditEvent, AuditOutcome, AuditPhase, AuditSink, TracingAuditSink};
pub use bootstrap::{
    BootstrapError, ConfigLoader, DispatchService, StaticConfigLoader, SystemConfigLoader,
    bootstrap_with,
};
pub use dispatch::{
    ActionDescriptor, ActionRegistry, ActionResponse, Capabilities, DispatchError, Dispatcher,
    ExpandHandler, HandlerBinding, HandlerError, HandlerResult, ParamSpec, PositionalHandler,
    ProtocolError, RegistryBuilder, RegistryError, RequestArgs, RequestContext, ResponseWriter,
};
pub use health::{HealthReporter, StructuredHealthReporter};
pub use session::{NoSessions, Session, SessionProvider, StaticSessions};
pub use stdio::{StdioError, run_stdio, serve};
pub use telemetry::{TelemetryError, TelemetryHandle};

#[cfg(test)]
mod tests;
