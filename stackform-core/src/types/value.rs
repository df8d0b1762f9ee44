//! Loosely-typed declared values.
//!
//! A declaration arrives from the orchestration host as nested maps and lists
//! of unknown shape. `DeclaredValue` captures that shape so the normalizer can
//! match on it exhaustively instead of asserting types at runtime.

use crate::error::{Result, StackformError};
use std::collections::BTreeMap;

/// A value of unknown shape supplied by the declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum DeclaredValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<DeclaredValue>),
    Map(BTreeMap<String, DeclaredValue>),
}

impl DeclaredValue {
    /// Name of the variant, used in `TypeMismatch` errors.
    pub fn kind(&self) -> &'static str {
        match self {
            DeclaredValue::Null => "null",
            DeclaredValue::Bool(_) => "bool",
            DeclaredValue::Integer(_) => "integer",
            DeclaredValue::Float(_) => "float",
            DeclaredValue::String(_) => "string",
            DeclaredValue::List(_) => "list",
            DeclaredValue::Map(_) => "map",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, DeclaredValue::Null)
    }

    /// Parse YAML (or JSON) text into a declared value.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let raw: serde_yaml::Value = serde_yaml::from_str(content)
            .map_err(|e| StackformError::DeclarationParse { reason: e.to_string() })?;
        Self::try_from(raw)
    }
}

impl TryFrom<serde_yaml::Value> for DeclaredValue {
    type Error = StackformError;

    fn try_from(value: serde_yaml::Value) -> Result<Self> {
        convert_yaml(value, "$")
    }
}

fn convert_yaml(value: serde_yaml::Value, path: &str) -> Result<DeclaredValue> {
    use serde_yaml::Value;

    Ok(match value {
        Value::Null => DeclaredValue::Null,
        Value::Bool(b) => DeclaredValue::Bool(b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                DeclaredValue::Integer(i)
            } else if let (true, Some(f)) = (n.is_f64(), n.as_f64()) {
                DeclaredValue::Float(f)
            } else {
                return Err(StackformError::InvalidValue {
                    field: path.to_string(),
                    reason: format!("number {} does not fit a 64-bit integer", n),
                });
            }
        }
        Value::String(s) => DeclaredValue::String(s),
        Value::Sequence(items) => DeclaredValue::List(
            items
                .into_iter()
                .enumerate()
                .map(|(i, item)| convert_yaml(item, &format!("{}[{}]", path, i)))
                .collect::<Result<Vec<_>>>()?,
        ),
        Value::Mapping(mapping) => {
            let mut map = BTreeMap::new();
            for (key, item) in mapping {
                let key = match key {
                    Value::String(s) => s,
                    other => {
                        return Err(StackformError::mismatch(
                            format!("{} (mapping key)", path),
                            "string",
                            yaml_kind(&other),
                        ))
                    }
                };
                let child = convert_yaml(item, &format!("{}.{}", path, key))?;
                map.insert(key, child);
            }
            DeclaredValue::Map(map)
        }
        Value::Tagged(tagged) => convert_yaml(tagged.value, path)?,
    })
}

fn yaml_kind(value: &serde_yaml::Value) -> &'static str {
    use serde_yaml::Value;

    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "list",
        Value::Mapping(_) => "map",
        Value::Tagged(_) => "tagged value",
    }
}

impl From<&str> for DeclaredValue {
    fn from(s: &str) -> Self {
        DeclaredValue::String(s.to_string())
    }
}

impl From<String> for DeclaredValue {
    fn from(s: String) -> Self {
        DeclaredValue::String(s)
    }
}

impl From<i64> for DeclaredValue {
    fn from(i: i64) -> Self {
        DeclaredValue::Integer(i)
    }
}

impl From<bool> for DeclaredValue {
    fn from(b: bool) -> Self {
        DeclaredValue::Bool(b)
    }
}

impl<T: Into<DeclaredValue>> From<Vec<T>> for DeclaredValue {
    fn from(items: Vec<T>) -> Self {
        DeclaredValue::List(items.into_iter().map(Into::into).collect())
    }
}
