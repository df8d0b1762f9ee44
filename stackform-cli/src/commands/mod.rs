//! CLI command implementations.

mod config;
mod stack;

pub use config::show as show_config;
pub use stack::{apply, destroy, refresh, render, status};
