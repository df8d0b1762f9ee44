//! Configuration management.

use crate::error::{Result, StackformError};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Persistent configuration for stackform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Container engine binary
    pub engine_program: String,
    /// Arguments placed before every compose command (e.g. `["compose"]`)
    pub engine_args: Vec<String>,
    /// Where the rendered manifest is written
    pub manifest_path: PathBuf,
    /// Where the host keeps the stack identity
    pub state_path: PathBuf,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            engine_program: "docker".to_string(),
            engine_args: vec!["compose".to_string()],
            manifest_path: PathBuf::from(paths::DEFAULT_MANIFEST),
            state_path: PathBuf::from(paths::DEFAULT_STATE_FILE),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the default location and apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&paths::config_path())?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load configuration from `path`. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| StackformError::InvalidConfig {
            reason: format!("Failed to read config {}: {}", path.display(), e),
        })?;
        serde_json::from_str(&content).map_err(|e| StackformError::InvalidConfig {
            reason: format!("Failed to parse config {}: {}", path.display(), e),
        })
    }

    /// Save configuration to `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| StackformError::io(parent, e))?;
        }
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            StackformError::InvalidConfig { reason: format!("Failed to serialize config: {}", e) }
        })?;
        std::fs::write(path, content).map_err(|e| StackformError::io(path, e))
    }

    /// Apply `STACKFORM_*` overrides looked up through `var`.
    ///
    /// `STACKFORM_ENGINE` is split on whitespace: the first word is the
    /// program, the rest replace `engine_args`.
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(engine) = var("STACKFORM_ENGINE") {
            let mut words = engine.split_whitespace().map(str::to_string);
            if let Some(program) = words.next() {
                self.engine_program = program;
                self.engine_args = words.collect();
            }
        }
        if let Some(manifest) = var("STACKFORM_MANIFEST") {
            self.manifest_path = PathBuf::from(manifest);
        }
        if let Some(state) = var("STACKFORM_STATE") {
            self.state_path = PathBuf::from(state);
        }
        if let Some(level) = var("STACKFORM_LOG") {
            self.log_level = level;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.manifest_path, PathBuf::from("docker-compose.yml"));
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config { engine_program: "podman".to_string(), ..Config::default() };
        config.save(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"log_level": "debug"}"#).unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.engine_program, "docker");
    }

    #[test]
    fn test_malformed_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(Config::load_from(&path), Err(StackformError::InvalidConfig { .. })));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("STACKFORM_ENGINE", "docker-compose"),
            ("STACKFORM_MANIFEST", "out/compose.yml"),
            ("STACKFORM_LOG", "trace"),
        ]
        .into_iter()
        .collect();
        let mut config = Config::default();
        config.apply_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.engine_program, "docker-compose");
        assert!(config.engine_args.is_empty());
        assert_eq!(config.manifest_path, PathBuf::from("out/compose.yml"));
        assert_eq!(config.state_path, PathBuf::from(".stackform/state.json"));
        assert_eq!(config.log_level, "trace");
    }
}
