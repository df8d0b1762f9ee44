//! Stack declaration normalization.
//!
//! The orchestration host hands over a loosely-typed declaration; this module
//! turns it into the typed `Stack` model with every default applied.

pub mod normalizer;


pub use normalizer::StackNormalizer;
