use camino::Utf8PathBuf;

/// Data directory used when no configuration layer supplies one.
pub const DEFAULT_DATA_DIR: &str = "data";

/// Default log filter expression used by the server.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Default data directory, relative to the working directory.
pub fn default_data_dir() -> Utf8PathBuf {
    Utf8PathBuf::from(DEFAULT_DATA_DIR)
}

/// Default log filter expression used by the server.
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format.
pub fn default_log_format() -> crate::logging::LogFormat {
    crate::logging::LogFormat::Json
}
