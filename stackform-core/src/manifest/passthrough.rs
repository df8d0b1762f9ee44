//! Passthrough (`extra_config`) serialization.
//!
//! Converts arbitrary declared values into document nodes. This is kept apart
//! from the fixed-field renderer; the two meet only in `merge_into`.

use super::document::{Mapping, Node, Scalar};
use crate::error::{Result, StackformError};
use crate::types::DeclaredValue;
use std::collections::BTreeMap;

/// Per-service keys the renderer emits itself. Passthrough config may not
/// reuse them.
pub const RESERVED_SERVICE_KEYS: &[&str] = &[
    "image",
    "restart",
    "ports",
    "depends_on",
    "environment",
    "command",
    "entrypoint",
    "deploy",
    "healthcheck",
];

/// Convert a declared value to a document node.
///
/// `path` locates the value in error messages.
pub fn to_node(value: &DeclaredValue, path: &str) -> Result<Node> {
    Ok(match value {
        DeclaredValue::Null => Node::Scalar(Scalar::Null),
        DeclaredValue::Bool(b) => Node::Scalar(Scalar::Bool(*b)),
        DeclaredValue::Integer(i) => Node::Scalar(Scalar::Int(*i)),
        DeclaredValue::Float(f) => {
            if !f.is_finite() {
                return Err(StackformError::SerializationError {
                    path: path.to_string(),
                    reason: format!("non-finite number {} has no manifest form", f),
                });
            }
            Node::Scalar(Scalar::Float(*f))
        }
        DeclaredValue::String(s) => Node::string(s.as_str()),
        DeclaredValue::List(items) => Node::Sequence(
            items
                .iter()
                .enumerate()
                .map(|(i, item)| to_node(item, &format!("{}[{}]", path, i)))
                .collect::<Result<Vec<_>>>()?,
        ),
        DeclaredValue::Map(map) => Node::Mapping(to_mapping(map, path)?),
    })
}

fn to_mapping(map: &BTreeMap<String, DeclaredValue>, path: &str) -> Result<Mapping> {
    let mut mapping = Mapping::new();
    for (key, value) in map {
        if key.is_empty() {
            return Err(StackformError::SerializationError {
                path: path.to_string(),
                reason: "empty mapping key".to_string(),
            });
        }
        mapping.insert(key.as_str(), to_node(value, &format!("{}.{}", path, key))?);
    }
    Ok(mapping)
}

/// Merge a service's passthrough config into its rendered entry.
///
/// Keys are appended in sorted order after the fixed fields. A key that names
/// a fixed field is rejected rather than overwritten.
pub fn merge_into(
    entry: &mut Mapping,
    service: &str,
    extra: &BTreeMap<String, DeclaredValue>,
) -> Result<()> {
    for key in extra.keys() {
        if RESERVED_SERVICE_KEYS.contains(&key.as_str()) || entry.contains_key(key) {
            return Err(StackformError::ExtraConfigConflict {
                service: service.to_string(),
                key: key.clone(),
            });
        }
    }

    let path = format!("services.{}.extra_config", service);
    entry.extend(to_mapping(extra, &path)?);
    Ok(())
}
