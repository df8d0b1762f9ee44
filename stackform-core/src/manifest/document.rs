//! Structured document builder.
//!
//! Manifests are assembled as a tree of `Node`s and handed to `serde_yaml` in
//! one pass. Block sections are added through `Mapping::insert_if_nonempty`,
//! so an empty list or map never leaves a dangling key behind.

use crate::error::{Result, StackformError};

/// Scalar leaf of a document.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Int(i64),
    /// Must be finite; the passthrough serializer rejects NaN and infinities.
    Float(f64),
    Str(String),
}

/// A document node.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Scalar(Scalar),
    Sequence(Vec<Node>),
    Mapping(Mapping),
}

impl Node {
    pub fn string(s: impl Into<String>) -> Self {
        Node::Scalar(Scalar::Str(s.into()))
    }

    pub fn int(i: i64) -> Self {
        Node::Scalar(Scalar::Int(i))
    }

    /// A sequence of strings.
    pub fn strings<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Node::Sequence(items.into_iter().map(Node::string).collect())
    }

    /// Empty sequences and mappings count as empty; scalars never do.
    pub fn is_empty(&self) -> bool {
        match self {
            Node::Scalar(_) => false,
            Node::Sequence(items) => items.is_empty(),
            Node::Mapping(mapping) => mapping.is_empty(),
        }
    }
}

impl From<Mapping> for Node {
    fn from(mapping: Mapping) -> Self {
        Node::Mapping(mapping)
    }
}

/// Insertion-ordered mapping.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Mapping {
    entries: Vec<(String, Node)>,
}

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry.
    pub fn insert(&mut self, key: impl Into<String>, node: impl Into<Node>) -> &mut Self {
        self.entries.push((key.into(), node.into()));
        self
    }

    /// Append an entry only when `node` is non-empty.
    pub fn insert_if_nonempty(&mut self, key: impl Into<String>, node: impl Into<Node>) -> &mut Self {
        let node = node.into();
        if !node.is_empty() {
            self.entries.push((key.into(), node));
        }
        self
    }

    /// Append every entry of `other`, keeping its order.
    pub fn extend(&mut self, other: Mapping) {
        self.entries.extend(other.entries);
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn get(&self, key: &str) -> Option<&Node> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// A whole manifest document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    pub root: Mapping,
}

impl Document {
    pub fn new(root: Mapping) -> Self {
        Self { root }
    }

    /// Emit the document as YAML text.
    ///
    /// An empty document emits "". Otherwise the text ends with a single
    /// newline.
    pub fn to_yaml(&self) -> Result<String> {
        if self.root.is_empty() {
            return Ok(String::new());
        }
        let value = serde_yaml::Value::Mapping(self.root.to_yaml_mapping());
        serde_yaml::to_string(&value).map_err(|e| StackformError::SerializationError {
            path: "manifest".to_string(),
            reason: e.to_string(),
        })
    }
}

impl Mapping {
    /// Convert to a `serde_yaml` mapping. Insertion order is kept.
    fn to_yaml_mapping(&self) -> serde_yaml::Mapping {
        self.entries
            .iter()
            .map(|(key, node)| (serde_yaml::Value::String(key.clone()), node.to_yaml_value()))
            .collect()
    }
}

impl Node {
    fn to_yaml_value(&self) -> serde_yaml::Value {
        use serde_yaml::Value;

        match self {
            Node::Scalar(Scalar::Null) => Value::Null,
            Node::Scalar(Scalar::Bool(b)) => Value::Bool(*b),
            Node::Scalar(Scalar::Int(i)) => Value::Number((*i).into()),
            Node::Scalar(Scalar::Float(f)) => Value::Number((*f).into()),
            Node::Scalar(Scalar::Str(s)) => Value::String(s.clone()),
            Node::Sequence(items) => Value::Sequence(items.iter().map(Node::to_yaml_value).collect()),
            Node::Mapping(mapping) => Value::Mapping(mapping.to_yaml_mapping()),
        }
    }
}
