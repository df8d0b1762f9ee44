//! Effective configuration.

use anyhow::{Context, Result};
use colored::Colorize;
use stackform_core::Config;
use std::path::Path;

/// Print the effective configuration, optionally persisting it to `save_to`.
pub fn show(config: &Config, save_to: Option<&Path>) -> Result<()> {
    let rendered =
        serde_json::to_string_pretty(config).context("Failed to serialize configuration")?;
    println!("{}", rendered);

    if let Some(path) = save_to {
        config.save(path).context("Failed to save configuration")?;
        println!("{} Configuration saved to {}", "✓".green().bold(), path.display());
    }
    Ok(())
}
