//! Shared doubles and fixtures for the dispatcher test suites.

mod audit;
mod config_loader;
mod registry;
mod reporter;
mod sessions;

pub use audit::RecordingAuditSink;
pub use config_loader::{EmptyDataDirLoader, FailingConfigLoader, TestConfigLoader};
pub use registry::{LOGGED_EXPAND_ACTION, PANICKING_ACTION, sample_registry};
pub use reporter::{HealthEvent, RecordingHealthReporter};
pub use sessions::{sessions_returning, untouched_sessions};
