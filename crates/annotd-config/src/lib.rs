//! Shared configuration for the annotation server dispatch core.
//!
//! Values are layered with `ortho_config`: built-in defaults, then the
//! `annotd.toml` configuration file, then `ANNOTD_*` environment variables,
//! then command-line flags. The dispatcher only needs a handful of settings:
//! the data root used to confine collection paths, the telemetry filter and
//! format, and a switch for annotator audit events.

mod data_root;
mod defaults;
mod logging;

use camino::{Utf8Path, Utf8PathBuf};
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub use data_root::{DataRoot, DataRootError, normalise_lexically};
pub use defaults::{
    DEFAULT_DATA_DIR, DEFAULT_LOG_FILTER, default_data_dir, default_log_filter,
    default_log_filter_string, default_log_format,
};
pub use logging::{LogFormat, LogFormatParseError};

/// Resolved configuration shared by the dispatcher and its embedding server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(
    prefix = "ANNOTD",
    discovery(
        app_name = "annotd",
        env_var = "ANNOTD_CONFIG_PATH",
        config_file_name = "annotd.toml",
        dotfile_name = ".annotd.toml",
        config_cli_long = "config-path"
    )
)]
pub struct Config {
    /// Directory under which every collection must resolve.
    #[ortho_config(default = default_data_dir())]
    pub data_dir: Utf8PathBuf,
    /// `tracing_subscriber::EnvFilter` expression.
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,
    /// Output format for telemetry.
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
    /// Suppresses annotator audit events for logged actions.
    #[ortho_config(default = false)]
    pub audit_disabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            audit_disabled: false,
        }
    }
}

impl Config {
    /// Configured data directory, as written.
    #[must_use]
    pub fn data_dir(&self) -> &Utf8Path {
        self.data_dir.as_path()
    }

    /// Log filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Log output format.
    #[must_use]
    pub fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Whether logged actions should emit audit events.
    #[must_use]
    pub fn audit_enabled(&self) -> bool {
        !self.audit_disabled
    }

    /// Resolves the data directory into an absolute, normalised root.
    ///
    /// # Errors
    ///
    /// Returns [`DataRootError`] when the directory is empty or the current
    /// working directory cannot be determined for a relative path.
    pub fn data_root(&self) -> Result<DataRoot, DataRootError> {
        DataRoot::new(self.data_dir.as_std_path())
    }
}
