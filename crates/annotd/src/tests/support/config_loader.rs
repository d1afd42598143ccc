//! Test configuration loaders for scenarios covering success and failure paths.

use std::ffi::OsString;
use std::sync::Arc;

use annotd_config::Config;
use ortho_config::{OrthoConfig, OrthoError};
use tempfile::TempDir;

use crate::bootstrap::ConfigLoader;

/// Loader that points the data directory at a temporary directory.
pub struct TestConfigLoader {
    data_dir: TempDir,
    audit_disabled: bool,
}

impl TestConfigLoader {
    #[must_use]
    pub fn new() -> Self {
        Self {
            data_dir: TempDir::new().expect("failed to create temporary data directory"),
            audit_disabled: false,
        }
    }

    /// Loader whose configuration turns audit events off.
    #[must_use]
    pub fn without_audit() -> Self {
        Self {
            audit_disabled: true,
            ..Self::new()
        }
    }

    fn data_dir(&self) -> String {
        self.data_dir
            .path()
            .to_str()
            .expect("temporary data path was not valid UTF-8")
            .to_owned()
    }
}

impl ConfigLoader for TestConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(Config {
            data_dir: self.data_dir().into(),
            audit_disabled: self.audit_disabled,
            ..Config::default()
        })
    }
}

/// Loader that intentionally fails by passing an invalid CLI value.
pub struct FailingConfigLoader;

impl ConfigLoader for FailingConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        let args = vec![
            OsString::from("annotd"),
            OsString::from("--log-format"),
            OsString::from("pretty"),
        ];
        Config::load_from_iter(args)
    }
}

/// Loader whose data directory is empty and therefore unusable.
pub struct EmptyDataDirLoader;

impl ConfigLoader for EmptyDataDirLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(Config {
            data_dir: String::new().into(),
            ..Config::default()
        })
    }
}
