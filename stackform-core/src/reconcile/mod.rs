//! Reconciliation of declared stacks against the container engine.

pub mod driver;
pub mod engine;
pub mod runner;

pub use driver::{write_manifest, Reconciler, StackResource, StackState, StatusReport};
pub use engine::ComposeEngine;
pub use runner::{CommandOutput, CommandRunner, Invocation, MockRunner, ProcessRunner};
