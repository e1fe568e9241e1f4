//! Tree builder: turns a dot-path source record into a tree store.

use std::collections::{HashMap, HashSet};

use tracing::{debug, instrument};

use crate::domain::entities::{
    same_name, Link, Node, NodeId, SourceRecord, SourceValue, OTHER_NAME,
};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::store::TreeStore;

/// One source key after path splitting.
#[derive(Debug, Clone, PartialEq)]
pub struct PathEntry {
    /// Full key as written in the source
    pub key: String,
    /// Last path segment
    pub name: String,
    /// Second-to-last segment, or the enclosing nested key
    pub parent: Option<String>,
    pub value: f64,
}

/// Constructs a tree store from a nested source record.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    entries: Vec<PathEntry>,
    /// Lowercased name -> index of the first entry declaring it
    first_seen: HashMap<String, usize>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store with every node and link hidden.
    #[instrument(level = "debug", skip(self, record))]
    pub fn build(&mut self, record: &SourceRecord) -> DomainResult<TreeStore> {
        self.entries.clear();
        self.first_seen.clear();

        flatten(record, None, &mut self.entries);
        debug!("build: {} entries after flattening", self.entries.len());

        let mut store = TreeStore::new();
        let mut ids: HashMap<String, NodeId> = HashMap::new();
        let mut emitted: Vec<usize> = Vec::new();

        for (i, entry) in self.entries.iter().enumerate() {
            if !entry.value.is_finite() || entry.value < 0.0 {
                return Err(DomainError::InvalidMagnitude {
                    key: entry.key.clone(),
                    value: entry.value,
                });
            }
            if same_name(&entry.name, OTHER_NAME) {
                return Err(DomainError::ReservedName(entry.name.clone()));
            }

            let folded = entry.name.to_lowercase();
            match self.first_seen.get(&folded) {
                None => {
                    self.first_seen.insert(folded.clone(), i);
                    let id = store.insert_node(Node::new(entry.name.clone(), None));
                    ids.insert(folded, id);
                    emitted.push(i);
                }
                Some(&first) => {
                    let first = &self.entries[first];
                    if first.name != entry.name {
                        return Err(DomainError::CaseCollision {
                            first: first.name.clone(),
                            second: entry.name.clone(),
                        });
                    }
                    if same_parent(&first.parent, &entry.parent) {
                        return Err(DomainError::DuplicateNode(entry.key.clone()));
                    }
                    return Err(DomainError::ConflictingParent {
                        name: entry.name.clone(),
                        first: first.parent.clone().unwrap_or_default(),
                        second: entry.parent.clone().unwrap_or_default(),
                    });
                }
            }
        }

        // Parents resolve once every node exists, so key order does not matter here.
        for i in emitted {
            let entry = &self.entries[i];
            let Some(parent) = entry.parent.as_deref() else {
                continue;
            };
            let folded_parent = parent.to_lowercase();
            if folded_parent == entry.name.to_lowercase() {
                return Err(DomainError::CycleDetected(entry.name.clone()));
            }
            let parent_id = match ids.get(&folded_parent) {
                Some(&id) => id,
                None => {
                    return Err(DomainError::MissingParent {
                        name: entry.name.clone(),
                        parent: parent.to_string(),
                    })
                }
            };
            let child_id = ids[&entry.name.to_lowercase()];

            let canonical = store
                .name_of(parent_id)
                .map(str::to_string)
                .unwrap_or_else(|| parent.to_string());
            if let Some(node) = store.node_mut(child_id) {
                node.parent = Some(canonical);
            }
            store.insert_link(Link::new(parent_id, child_id, entry.value));
        }

        check_acyclic(&store)?;
        debug!(
            "build: {} nodes, {} links",
            store.len(),
            store.links().len()
        );
        Ok(store)
    }

    /// Entries produced by the last build, in source order.
    pub fn entries(&self) -> &[PathEntry] {
        &self.entries
    }
}

fn same_parent(a: &Option<String>, b: &Option<String>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => same_name(a, b),
        (None, None) => true,
        _ => false,
    }
}

/// Split every key into (name, parent) in preorder, recursing into nested records.
pub fn flatten(record: &SourceRecord, enclosing: Option<&str>, out: &mut Vec<PathEntry>) {
    for (key, value) in record {
        let mut segments = key.rsplit('.');
        let name = segments.next().unwrap_or(key.as_str()).to_string();
        let parent = segments
            .next()
            .or(enclosing)
            .map(str::to_string);

        out.push(PathEntry {
            key: key.clone(),
            name: name.clone(),
            parent,
            value: value.magnitude(),
        });

        if let SourceValue::Nested(inner) = value {
            flatten(inner, Some(&name), out);
        }
    }
}

fn check_acyclic(store: &TreeStore) -> DomainResult<()> {
    for (_, node) in store.nodes() {
        let mut seen: HashSet<String> = HashSet::new();
        let mut current = node.parent.clone();
        seen.insert(node.name.to_lowercase());
        while let Some(parent) = current {
            if !seen.insert(parent.to_lowercase()) {
                return Err(DomainError::CycleDetected(node.name.clone()));
            }
            current = store
                .find(&parent)
                .and_then(|id| store.node(id))
                .and_then(|p| p.parent.clone());
        }
    }
    Ok(())
}
