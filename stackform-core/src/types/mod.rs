//! Core domain types for stackform.

pub mod network;
pub mod stack;
pub mod value;
pub mod volume;

// Re-exports
pub use network::{Network, DEFAULT_NETWORK_DRIVER};
pub use stack::{HealthCheck, Service, Stack, DEFAULT_REPLICAS, DEFAULT_RESTART};
pub use value::DeclaredValue;
pub use volume::{Volume, DEFAULT_VOLUME_DRIVER};
