//! Dispatcher bootstrap orchestration.

use std::sync::Arc;

use annotd_config::{Config, DataRootError};
use ortho_config::{OrthoConfig, OrthoError};
use thiserror::Error;

use crate::audit::AuditSink;
use crate::dispatch::{ActionRegistry, Dispatcher};
use crate::health::HealthReporter;
use crate::session::SessionProvider;
use crate::telemetry::{self, TelemetryError, TelemetryHandle};

/// Trait abstracting configuration loading for testability.
pub trait ConfigLoader: Send + Sync {
    /// Loads the dispatcher configuration.
    fn load(&self) -> Result<Config, Arc<OrthoError>>;
}

/// Loader that delegates to [`Config::load`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemConfigLoader;

impl ConfigLoader for SystemConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Config::load()
    }
}

/// Loader that hands out an already resolved configuration.
#[derive(Debug, Clone)]
pub struct StaticConfigLoader {
    config: Config,
}

impl StaticConfigLoader {
    /// Wraps `config`.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(self.config.clone())
    }
}

/// Errors surfaced during bootstrap.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Configuration failed to load.
    #[error("failed to load configuration: {source}")]
    Configuration {
        /// Underlying loader error.
        #[source]
        source: Arc<OrthoError>,
    },
    /// Telemetry initialisation failed.
    #[error("failed to initialise telemetry: {source}")]
    Telemetry {
        /// Underlying telemetry error.
        #[source]
        source: TelemetryError,
    },
    /// The data directory could not be resolved.
    #[error("failed to resolve data directory: {source}")]
    DataRoot {
        /// Resolution error.
        #[source]
        source: DataRootError,
    },
}

/// Result of a successful bootstrap invocation.
pub struct DispatchService {
    config: Config,
    dispatcher: Dispatcher,
    telemetry: TelemetryHandle,
}

impl DispatchService {
    /// Accessor for the resolved configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The ready dispatcher.
    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Accessor for the telemetry handle, primarily useful for testing.
    #[must_use]
    pub fn telemetry(&self) -> TelemetryHandle {
        self.telemetry
    }

    /// Consumes the service, keeping only the dispatcher.
    #[must_use]
    pub fn into_dispatcher(self) -> Dispatcher {
        self.dispatcher
    }
}

/// Bootstraps a dispatcher using the supplied collaborators.
///
/// # Errors
///
/// Returns [`BootstrapError`] when configuration, telemetry, or the data
/// directory cannot be set up. The reporter is told about every failure.
pub fn bootstrap_with(
    loader: &dyn ConfigLoader,
    reporter: Arc<dyn HealthReporter>,
    registry: ActionRegistry,
    sessions: Arc<dyn SessionProvider>,
    audit: Arc<dyn AuditSink>,
) -> Result<DispatchService, BootstrapError> {
    reporter.bootstrap_starting();

    let config = match loader.load() {
        Ok(config) => config,
        Err(source) => {
            let error = BootstrapError::Configuration { source };
            reporter.bootstrap_failed(&error);
            return Err(error);
        }
    };

    let telemetry = match telemetry::initialise(&config) {
        Ok(handle) => handle,
        Err(source) => {
            let error = BootstrapError::Telemetry { source };
            reporter.bootstrap_failed(&error);
            return Err(error);
        }
    };

    let data_root = match config.data_root() {
        Ok(root) => root,
        Err(source) => {
            let error = BootstrapError::DataRoot { source };
            reporter.bootstrap_failed(&error);
            return Err(error);
        }
    };

    let actions = registry.len();
    let dispatcher = Dispatcher::new(Arc::new(registry), data_root, sessions, audit)
        .with_audit_enabled(config.audit_enabled());
    reporter.bootstrap_succeeded(&config, actions);

    Ok(DispatchService {
        config,
        dispatcher,
        telemetry,
    })
}
