//! Centralized path configuration for stackform.

use std::path::PathBuf;

/// Get the stackform configuration directory.
///
/// Resolution order:
/// 1. `STACKFORM_CONFIG_DIR` environment variable
/// 2. `<platform config dir>/stackform` (e.g. `~/.config/stackform`)
/// 3. `./.stackform` when no home directory can be found
pub fn config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("STACKFORM_CONFIG_DIR") {
        return PathBuf::from(dir);
    }

    dirs::config_dir()
        .map(|d| d.join("stackform"))
        .unwrap_or_else(|| PathBuf::from(".stackform"))
}

/// Get the configuration file path.
pub fn config_path() -> PathBuf {
    config_dir().join("config.json")
}

/// Default manifest location, relative to the working directory.
pub const DEFAULT_MANIFEST: &str = "docker-compose.yml";

/// Default identity state file, relative to the working directory.
pub const DEFAULT_STATE_FILE: &str = ".stackform/state.json";
