//! Semantic document tree with source ranges.
//!
//! A [`Document`] owns a single root [`Node`]. Every node records the
//! [`Range`] it came from; mapping children have their range widened to the
//! whole `key: value` pair so that a cursor over the key resolves to the
//! child, not only a cursor over the value.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::locate;
use crate::schema;

/// A zero-based (line, character) position in the source text.
///
/// Ordering is lexicographic: line first, then character.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl Position {
    pub fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

/// A span of source text. `start <= end` always holds for ranges produced
/// by the builder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Whether `pos` falls within this range.
    ///
    /// Lines are checked first; the character bound only applies on the
    /// first and last line. Both ends are inclusive.
    pub fn contains(&self, pos: Position) -> bool {
        if pos.line < self.start.line || pos.line > self.end.line {
            return false;
        }
        if pos.line == self.start.line && pos.character < self.start.character {
            return false;
        }
        if pos.line == self.end.line && pos.character > self.end.character {
            return false;
        }
        true
    }
}

/// The payload of a [`Node`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Raw source text of the scalar, quoting and escapes preserved.
    Scalar(String),
    /// Key to child, in declaration order.
    Mapping(IndexMap<String, Node>),
    /// Items in source order.
    Sequence(Vec<Node>),
    /// A key without a value, or a shape the builder did not recognise.
    Null,
}

/// An element of the semantic tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// The mapping key that produced this node. Empty for sequence items
    /// and the document root.
    pub key: String,
    pub value: Value,
    pub range: Range,
}

impl Node {
    pub fn scalar(key: impl Into<String>, text: impl Into<String>, range: Range) -> Self {
        Self {
            key: key.into(),
            value: Value::Scalar(text.into()),
            range,
        }
    }

    pub fn null(key: impl Into<String>, range: Range) -> Self {
        Self {
            key: key.into(),
            value: Value::Null,
            range,
        }
    }

    /// Child by key. `None` for missing keys and for non-mapping nodes.
    pub fn get(&self, key: &str) -> Option<&Node> {
        match &self.value {
            Value::Mapping(children) => children.get(key),
            _ => None,
        }
    }

    /// Raw scalar text, or `None` if this is not a scalar.
    pub fn as_scalar(&self) -> Option<&str> {
        match &self.value {
            Value::Scalar(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&IndexMap<String, Node>> {
        match &self.value {
            Value::Mapping(children) => Some(children),
            _ => None,
        }
    }

    /// Sequence items, or an empty slice for anything that is not a sequence.
    pub fn as_sequence(&self) -> &[Node] {
        match &self.value {
            Value::Sequence(items) => items,
            _ => &[],
        }
    }

    pub fn is_mapping(&self) -> bool {
        matches!(self.value, Value::Mapping(_))
    }

    pub fn is_sequence(&self) -> bool {
        matches!(self.value, Value::Sequence(_))
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self.value, Value::Scalar(_))
    }

    pub fn is_null(&self) -> bool {
        matches!(self.value, Value::Null)
    }

    /// Direct children in source order: mapping values or sequence items.
    pub fn children(&self) -> Box<dyn Iterator<Item = &Node> + '_> {
        match &self.value {
            Value::Mapping(children) => Box::new(children.values()),
            Value::Sequence(items) => Box::new(items.iter()),
            Value::Scalar(_) | Value::Null => Box::new(std::iter::empty()),
        }
    }
}

/// A parsed YAML document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// URI the text was parsed for. Empty when built without one.
    pub uri: String,
    pub root: Node,
    /// Root `apiVersion` scalar, or empty.
    pub api_version: String,
    /// Root `kind` scalar, or empty.
    pub kind: String,
}

impl Document {
    /// The most specific node at `pos`, if any.
    pub fn find_node_at_position(&self, pos: Position) -> Option<&Node> {
        locate::find_node_at_position(&self.root, pos)
    }

    /// Whether `apiVersion` names one of the known Tekton API groups.
    pub fn is_tekton_resource(&self) -> bool {
        schema::is_tekton_resource(&self.api_version)
    }

    /// `metadata.name` as raw scalar text.
    pub fn metadata_name(&self) -> Option<&str> {
        self.root.get("metadata")?.get("name")?.as_scalar()
    }

    pub fn spec(&self) -> Option<&Node> {
        self.root.get("spec")
    }
}
