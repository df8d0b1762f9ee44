//! Stack identity persistence.
//!
//! The CLI plays the orchestration host: the only thing it remembers between
//! runs is the identity of the stack it last applied.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use stackform_core::StackResource;
use std::path::Path;

/// Contents of the state file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateFile {
    /// Stack name while the stack is considered present
    pub id: Option<String>,
}

impl StateFile {
    /// Load the state file. A missing file means nothing was applied yet.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read state file {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse state file {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write state file {}", path.display()))
    }

    pub fn resource(&self) -> StackResource {
        StackResource::from_id(self.id.clone())
    }

    pub fn from_resource(resource: &StackResource) -> Self {
        Self { id: resource.id.clone() }
    }
}
