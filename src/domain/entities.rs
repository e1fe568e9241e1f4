//! Domain entities: core data structures

use std::fmt;
use std::str::FromStr;

use generational_arena::Index;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Name of the synthetic node that folds overflow siblings.
pub const OTHER_NAME: &str = "Other";

/// Case-insensitive name equality, folding full Unicode case.
pub fn same_name(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}

/// Handle of a node inside the tree store.
///
/// Handles of deleted nodes stay invalid even if their arena slot is reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) Index);

/// A named entity in the hierarchy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Unique identity key, original casing
    pub name: String,
    /// Name of the parent node, None for roots
    pub parent: Option<String>,
    pub is_visible: bool,
    /// True for the aggregated "Other" node created by expand
    pub synthetic: bool,
}

impl Node {
    pub fn new(name: impl Into<String>, parent: Option<String>) -> Self {
        Self {
            name: name.into(),
            parent,
            is_visible: false,
            synthetic: false,
        }
    }

    /// Synthetic overflow node owned by `parent`, visible on creation.
    pub fn other(parent: impl Into<String>) -> Self {
        Self {
            name: OTHER_NAME.to_string(),
            parent: Some(parent.into()),
            is_visible: true,
            synthetic: true,
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Case-insensitive name comparison used for every lookup.
    pub fn matches(&self, name: &str) -> bool {
        same_name(&self.name, name)
    }

    pub fn is_child_of(&self, name: &str) -> bool {
        self.parent
            .as_deref()
            .is_some_and(|p| same_name(p, name))
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Weighted edge from a parent node to one of its direct children.
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub source: NodeId,
    pub target: NodeId,
    /// Magnitude flowing from source to target, never negative
    pub value: f64,
    pub is_visible: bool,
}

impl Link {
    pub fn new(source: NodeId, target: NodeId, value: f64) -> Self {
        Self {
            source,
            target,
            value,
            is_visible: false,
        }
    }
}

/// Edge identity as `"{source}--{target}"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct LinkKey(String);

impl LinkKey {
    pub fn new(source: &str, target: &str) -> Self {
        Self(format!("{source}--{target}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LinkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Nested source record: dot-separated paths mapped to magnitudes.
///
/// Key order is kept as read; it decides node order in the store.
pub type SourceRecord = IndexMap<String, SourceValue>;

/// Value of a source record entry.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum SourceValue {
    Magnitude(f64),
    Nested(SourceRecord),
}

impl SourceValue {
    /// Magnitude of the entry; nested records sum their direct entries.
    pub fn magnitude(&self) -> f64 {
        match self {
            SourceValue::Magnitude(v) => *v,
            SourceValue::Nested(record) => record.values().map(SourceValue::magnitude).sum(),
        }
    }
}

/// User action against the visibility engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Expand(String),
    Collapse(String),
    Toggle(String),
}

impl Action {
    pub fn target(&self) -> &str {
        match self {
            Action::Expand(name) | Action::Collapse(name) | Action::Toggle(name) => name,
        }
    }
}

impl FromStr for Action {
    type Err = String;

    /// Parses `expand:NAME`, `collapse:NAME` or `toggle:NAME`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (verb, name) = s
            .split_once(':')
            .ok_or_else(|| format!("expected VERB:NAME, got '{s}'"))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(format!("missing node name in '{s}'"));
        }
        match verb.trim().to_ascii_lowercase().as_str() {
            "expand" => Ok(Action::Expand(name.to_string())),
            "collapse" => Ok(Action::Collapse(name.to_string())),
            "toggle" => Ok(Action::Toggle(name.to_string())),
            other => Err(format!("unknown action '{other}'")),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Expand(name) => write!(f, "expand:{name}"),
            Action::Collapse(name) => write!(f, "collapse:{name}"),
            Action::Toggle(name) => write!(f, "toggle:{name}"),
        }
    }
}
