// Configuration loading

pub mod session;
pub mod settings;

use std::path::PathBuf;

/// Overrides the configuration directory (tests, portable installs)
pub const CONFIG_DIR_ENV: &str = "DATEDIT_CONFIG_DIR";

/// Directory holding settings.json and session.json
pub fn config_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV) {
        return PathBuf::from(dir);
    }
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("datedit")
}
