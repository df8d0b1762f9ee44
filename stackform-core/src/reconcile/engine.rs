//! Compose CLI invocations.
//!
//! Builds the `up`, `down` and `ps` command lines for a stack. Every command
//! names the manifest and the project explicitly so the engine never guesses
//! either from the working directory.

use super::runner::Invocation;
use crate::config::Config;
use std::path::{Path, PathBuf};

/// How to reach the compose CLI for one manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposeEngine {
    program: String,
    base_args: Vec<String>,
    manifest_path: PathBuf,
}

impl ComposeEngine {
    pub fn new(
        program: impl Into<String>,
        base_args: Vec<String>,
        manifest_path: impl Into<PathBuf>,
    ) -> Self {
        Self { program: program.into(), base_args, manifest_path: manifest_path.into() }
    }

    /// `docker compose` against `docker-compose.yml` in the working directory.
    pub fn docker() -> Self {
        Self::from_config(&Config::default())
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.engine_program.clone(),
            config.engine_args.clone(),
            config.manifest_path.clone(),
        )
    }

    pub fn manifest_path(&self) -> &Path {
        &self.manifest_path
    }

    /// Bring the stack up, detached.
    pub fn up(&self, project: &str) -> Invocation {
        self.invocation(project, &["up", "-d"])
    }

    /// Bring the stack down.
    pub fn down(&self, project: &str) -> Invocation {
        self.invocation(project, &["down"])
    }

    /// List the services currently running for the stack.
    pub fn ps_services(&self, project: &str) -> Invocation {
        self.invocation(project, &["ps", "--services"])
    }

    fn invocation(&self, project: &str, action: &[&str]) -> Invocation {
        let mut args = self.base_args.clone();
        args.push("-f".to_string());
        args.push(self.manifest_path.to_string_lossy().to_string());
        args.push("-p".to_string());
        args.push(project.to_string());
        args.extend(action.iter().map(|a| a.to_string()));

        Invocation::new(self.program.as_str(), args)
    }
}

/// Parse `ps --services` output into service names.
pub fn parse_service_list(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
