//! Line-oriented driver that serves requests from a reader.
//!
//! Each input line is one JSON request; each produces exactly one response
//! line. Blank lines are skipped. The driver stops at end of input.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::audit::TracingAuditSink;
use crate::bootstrap::{BootstrapError, SystemConfigLoader, bootstrap_with};
use crate::dispatch::{
    ActionRegistry, DISPATCH_TARGET, Dispatcher, RegistryError, RequestContext,
    ResponseWriteError, ResponseWriter,
};
use crate::health::StructuredHealthReporter;
use crate::session::NoSessions;

/// Failures that end a stdio session.
#[derive(Debug, Error)]
pub enum StdioError {
    /// The built-in actions could not be registered.
    #[error(transparent)]
    Registry(#[from] RegistryError),
    /// Bootstrap failed.
    #[error(transparent)]
    Bootstrap(#[from] BootstrapError),
    /// Reading a request line failed.
    #[error("failed to read request: {0}")]
    Read(#[source] io::Error),
    /// Writing a response line failed.
    #[error(transparent)]
    Write(#[from] ResponseWriteError),
}

/// Dispatches every line of `reader`, writing responses to `writer`.
///
/// Returns the number of requests handled.
///
/// # Errors
///
/// Returns [`StdioError::Read`] or [`StdioError::Write`] on transport
/// failure. Request failures are answered in-band and never end the loop.
pub fn serve<R: BufRead, W: Write>(
    dispatcher: &Dispatcher,
    context: &RequestContext,
    reader: R,
    writer: W,
) -> Result<usize, StdioError> {
    let mut writer = ResponseWriter::new(writer);
    let mut handled = 0;
    for line in reader.split(b'\n') {
        let line = line.map_err(StdioError::Read)?;
        if line.trim_ascii().is_empty() {
            continue;
        }
        dispatcher.dispatch_line(&line, context, &mut writer)?;
        handled += 1;
    }
    info!(target: DISPATCH_TARGET, handled, "input closed");
    Ok(handled)
}

/// Bootstraps from the environment and serves stdin until it closes.
///
/// Only the built-in actions are registered, nobody is authenticated, and
/// audit events go to the tracing subscriber.
///
/// # Errors
///
/// Returns [`StdioError`] if bootstrap or the transport fails.
pub fn run_stdio() -> Result<(), StdioError> {
    let mut builder = ActionRegistry::builder();
    builder.with_builtins()?;
    let service = bootstrap_with(
        &SystemConfigLoader,
        Arc::new(StructuredHealthReporter::new()),
        builder.build(),
        Arc::new(NoSessions),
        Arc::new(TracingAuditSink),
    )?;

    let context = RequestContext::new().with_client("-", "stdin");
    let stdin = io::stdin();
    let stdout = io::stdout();
    serve(service.dispatcher(), &context, stdin.lock(), stdout.lock())?;
    Ok(())
}
