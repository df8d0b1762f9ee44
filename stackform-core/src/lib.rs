//! stackform core library
//!
//! Typed model of a compose stack, the normalizer that builds it from a
//! loosely-typed declaration, the manifest renderer and the reconciliation
//! driver that applies the manifest through the compose CLI.

pub mod config;
pub mod declare;
pub mod error;
pub mod manifest;
pub mod observability;
pub mod paths;
pub mod reconcile;
pub mod types;

// Re-export commonly used items
pub use config::Config;
pub use declare::StackNormalizer;
pub use error::{Result, StackformError};
pub use manifest::ManifestRenderer;
pub use observability::init as init_observability;
pub use reconcile::{
    CommandOutput, CommandRunner, ComposeEngine, Invocation, MockRunner, ProcessRunner, Reconciler,
    StackResource, StackState, StatusReport,
};
pub use types::{DeclaredValue, HealthCheck, Network, Service, Stack, Volume};
