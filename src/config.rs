use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "wardbook";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Directory holding the database, under the platform data directory.
pub fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Database file location. `WARDBOOK_DB` overrides it for embedders and
/// scratch setups.
pub fn database_path() -> PathBuf {
    match std::env::var_os("WARDBOOK_DB") {
        Some(path) => PathBuf::from(path),
        None => data_dir().join("wardbook.db"),
    }
}

/// Default tracing filter when RUST_LOG is unset.
pub fn default_log_filter() -> String {
    format!("{APP_NAME}=info")
}
