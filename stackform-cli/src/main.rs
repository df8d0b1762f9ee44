use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use stackform_core::Config;
use std::path::PathBuf;

mod commands;
mod state;

#[derive(Parser)]
#[command(name = "stackform")]
#[command(about = "Declarative compose stacks driven through the docker compose CLI", long_about = None)]
struct Cli {
    /// Where to write the rendered manifest
    #[arg(long, global = true)]
    manifest: Option<PathBuf>,

    /// Where the stack identity is kept
    #[arg(long, global = true)]
    state: Option<PathBuf>,

    /// Compose command, e.g. "docker compose" or "podman-compose"
    #[arg(long, global = true)]
    engine: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the manifest without touching the engine
    Render {
        /// Stack declaration (YAML or JSON)
        #[arg(short, long)]
        file: PathBuf,

        /// Write to this path instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Create or update a stack
    Apply {
        /// Stack declaration (YAML or JSON)
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Check whether the stack is still running
    Refresh {
        /// Stack declaration (YAML or JSON)
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Tear a stack down
    Destroy {
        /// Stack declaration (YAML or JSON)
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Show the stored stack identity
    Status,

    /// Show the effective configuration
    Config {
        /// Save it as the default configuration
        #[arg(long)]
        save: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load().context("Failed to load configuration")?;
    if let Some(manifest) = cli.manifest {
        config.manifest_path = manifest;
    }
    if let Some(state) = cli.state {
        config.state_path = state;
    }
    if let Some(engine) = cli.engine {
        config.apply_env(|key| (key == "STACKFORM_ENGINE").then(|| engine.clone()));
    }
    if cli.verbose {
        config.log_level = "debug".to_string();
    }

    stackform_core::init_observability(&config.log_level)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    match cli.command {
        Commands::Render { file, output } => commands::render(&file, output.as_deref())?,
        Commands::Apply { file } => commands::apply(&config, &file)?,
        Commands::Refresh { file } => commands::refresh(&config, &file)?,
        Commands::Destroy { file } => commands::destroy(&config, &file)?,
        Commands::Status => commands::status(&config)?,
        Commands::Config { save } => {
            let path = save.then(stackform_core::paths::config_path);
            commands::show_config(&config, path.as_deref())?
        }
    }

    Ok(())
}
