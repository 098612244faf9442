// Configuration loading

pub mod settings;

pub use settings::Settings;

use std::path::PathBuf;

/// Root directory for all scriptedit state (settings, logs).
/// Falls back to the working directory when the platform has no config dir.
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("scriptedit")
}

/// Directory for rotated log files.
pub fn logs_dir() -> PathBuf {
    config_dir().join("logs")
}
