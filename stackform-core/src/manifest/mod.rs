//! Compose manifest generation.
//!
//! The manifest is built as a structured document (`document`), filled in by
//! the fixed-field renderer (`renderer`) and the passthrough serializer
//! (`passthrough`), then emitted as YAML.

pub mod document;
pub mod passthrough;
pub mod renderer;


pub use document::{Document, Mapping, Node, Scalar};
pub use renderer::ManifestRenderer;
