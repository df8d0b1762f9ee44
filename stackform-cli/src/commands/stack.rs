//! Stack commands: render, apply, refresh, destroy, status.

use crate::state::StateFile;
use anyhow::{Context, Result};
use colored::Colorize;
use stackform_core::{
    ComposeEngine, Config, DeclaredValue, ManifestRenderer, ProcessRunner, Reconciler, Stack,
    StackNormalizer,
};
use std::path::Path;
use tracing::info;

/// Read and normalize a stack declaration file.
pub(crate) fn load_stack(file: &Path) -> Result<Stack> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read declaration {}", file.display()))?;
    let declaration = DeclaredValue::from_yaml_str(&content)
        .with_context(|| format!("Failed to parse declaration {}", file.display()))?;
    let stack = StackNormalizer::normalize(&declaration)
        .with_context(|| format!("Invalid declaration {}", file.display()))?;
    Ok(stack)
}

fn reconciler(config: &Config) -> Reconciler<ProcessRunner> {
    Reconciler::new(ProcessRunner, ComposeEngine::from_config(config))
}

/// Render the manifest to stdout or `output`.
pub fn render(file: &Path, output: Option<&Path>) -> Result<()> {
    let stack = load_stack(file)?;
    let manifest = ManifestRenderer::render(&stack).context("Failed to render manifest")?;

    match output {
        Some(path) => {
            stackform_core::reconcile::write_manifest(path, &manifest)?;
            println!("{} Manifest written to {}", "✓".green().bold(), path.display());
        }
        None => print!("{}", manifest),
    }
    Ok(())
}

/// Create the stack, or update it when an identity is already stored.
pub fn apply(config: &Config, file: &Path) -> Result<()> {
    let stack = load_stack(file)?;
    let mut resource = StateFile::load(&config.state_path)?.resource();
    let rec = reconciler(config);

    println!(
        "{} Applying stack {} ({} service(s)): {}",
        "→".cyan().bold(),
        stack.name.bold(),
        stack.services.len(),
        stack.service_names().join(", ").dimmed()
    );

    let result = if resource.is_present() {
        rec.update(&mut resource, &stack)
    } else {
        rec.create(&mut resource, &stack)
    };

    StateFile::from_resource(&resource).save(&config.state_path)?;
    result.context("Failed to apply stack")?;

    info!(stack = %stack.name, "Stack applied");
    println!(
        "{} Stack applied: {} ({})",
        "✓".green().bold(),
        stack.name.bold(),
        config.manifest_path.display().to_string().dimmed()
    );
    Ok(())
}

/// Compare the stored identity with what the engine reports as running.
pub fn refresh(config: &Config, file: &Path) -> Result<()> {
    let stack = load_stack(file)?;
    let state = StateFile::load(&config.state_path)?;
    let mut resource = state.resource();

    if !resource.is_present() {
        println!("{} Stack {} is not applied", "•".dimmed(), stack.name.bold());
        return Ok(());
    }

    let rec = reconciler(config);
    let result = rec.read(&mut resource, &stack);
    StateFile::from_resource(&resource).save(&config.state_path)?;
    let report = result.context("Failed to refresh stack")?;

    if report.redeclared {
        println!("{} Manifest was missing and has been regenerated", "⚠".yellow().bold());
    }
    if report.running.is_empty() {
        println!(
            "{} No running services found; stack {} marked as destroyed",
            "⚠".yellow().bold(),
            stack.name.bold()
        );
    } else {
        println!("{} Stack {} is running:", "✓".green().bold(), stack.name.bold());
        for service in &report.running {
            println!("  {} {}", "•".dimmed(), service);
        }
    }
    Ok(())
}

/// Tear the stack down and forget its identity.
pub fn destroy(config: &Config, file: &Path) -> Result<()> {
    let stack = load_stack(file)?;
    let mut resource = StateFile::load(&config.state_path)?.resource();
    let rec = reconciler(config);

    let result = rec.delete(&mut resource, &stack);
    StateFile::from_resource(&resource).save(&config.state_path)?;
    result.context("Failed to tear down stack")?;

    println!("{} Stack destroyed: {}", "✓".green().bold(), stack.name.bold());
    Ok(())
}

/// Print the stored identity.
pub fn status(config: &Config) -> Result<()> {
    let state = StateFile::load(&config.state_path)?;
    match state.id {
        Some(id) => println!("{} {}", "present".green().bold(), id),
        None => println!("{}", "absent".dimmed()),
    }
    Ok(())
}
