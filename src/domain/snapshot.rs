//! Visible subgraph handed to the layout collaborator.

use std::collections::HashSet;

use serde::Serialize;
use tracing::warn;

use crate::domain::entities::{same_name, LinkKey, NodeId};
use crate::domain::store::TreeStore;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisibleNode {
    #[serde(skip)]
    pub id: NodeId,
    pub name: String,
    pub parent: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub synthetic: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisibleLink {
    pub key: LinkKey,
    #[serde(skip)]
    pub source: NodeId,
    #[serde(skip)]
    pub target: NodeId,
    #[serde(rename = "source")]
    pub source_name: String,
    #[serde(rename = "target")]
    pub target_name: String,
    pub value: f64,
}

/// Filtered `{nodes, links}` view over a tree store.
///
/// Every link's endpoints are present in `nodes`; both lists follow store order.
///
/// Names are unique for source nodes only. Several parents may each show an
/// "Other" node, so `VisibleNode::id` is the only unique key for synthetic
/// nodes and name lookups return the first match.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Snapshot {
    pub nodes: Vec<VisibleNode>,
    pub links: Vec<VisibleLink>,
}

impl Snapshot {
    /// Project the visible part of `store`. Never mutates.
    pub fn project(store: &TreeStore) -> Self {
        let nodes: Vec<VisibleNode> = store
            .nodes()
            .filter(|(_, node)| node.is_visible)
            .map(|(id, node)| VisibleNode {
                id,
                name: node.name.clone(),
                parent: node.parent.clone(),
                synthetic: node.synthetic,
            })
            .collect();
        let visible: HashSet<NodeId> = nodes.iter().map(|n| n.id).collect();

        let mut links = Vec::new();
        for link in store.links().iter().filter(|l| l.is_visible) {
            if !visible.contains(&link.source) || !visible.contains(&link.target) {
                warn!("project: dropping visible link with hidden endpoint");
                continue;
            }
            let (Some(source_name), Some(target_name)) =
                (store.name_of(link.source), store.name_of(link.target))
            else {
                continue;
            };
            links.push(VisibleLink {
                key: LinkKey::new(source_name, target_name),
                source: link.source,
                target: link.target,
                source_name: source_name.to_string(),
                target_name: target_name.to_string(),
                value: link.value,
            });
        }

        Self { nodes, links }
    }

    pub fn node(&self, id: NodeId) -> Option<&VisibleNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// First node with this name, case-insensitive.
    pub fn find(&self, name: &str) -> Option<&VisibleNode> {
        self.nodes.iter().find(|n| same_name(&n.name, name))
    }

    pub fn contains_node(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    pub fn node_names(&self) -> Vec<&str> {
        self.nodes.iter().map(|n| n.name.as_str()).collect()
    }

    pub fn link(&self, source: &str, target: &str) -> Option<&VisibleLink> {
        self.links.iter().find(|l| {
            same_name(&l.source_name, source) && same_name(&l.target_name, target)
        })
    }

    pub fn incoming(&self, id: NodeId) -> impl Iterator<Item = &VisibleLink> + '_ {
        self.links.iter().filter(move |l| l.target == id)
    }

    pub fn outgoing(&self, id: NodeId) -> impl Iterator<Item = &VisibleLink> + '_ {
        self.links.iter().filter(move |l| l.source == id)
    }

    /// Node magnitude: the larger of its incoming and outgoing sums.
    pub fn value_of(&self, id: NodeId) -> f64 {
        let incoming: f64 = self.incoming(id).map(|l| l.value).sum();
        let outgoing: f64 = self.outgoing(id).map(|l| l.value).sum();
        incoming.max(outgoing)
    }

    /// Percentage of this node's value relative to its source nodes' values.
    pub fn share_of_parent(&self, id: NodeId) -> Option<f64> {
        let parent_value: f64 = self.incoming(id).map(|l| self.value_of(l.source)).sum();
        if parent_value <= 0.0 {
            return None;
        }
        Some(self.value_of(id) / parent_value * 100.0)
    }

    /// Visible links whose key the cache has not seen yet.
    pub fn entering_links<'a>(
        &'a self,
        seen: impl Fn(&LinkKey) -> bool + 'a,
    ) -> impl Iterator<Item = &'a VisibleLink> + 'a {
        self.links.iter().filter(move |l| !seen(&l.key))
    }

    /// Distance from the nearest root, following visible links.
    pub fn depth_of(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = id;
        let mut seen = HashSet::new();
        while let Some(link) = self.incoming(current).next() {
            if !seen.insert(current) {
                break;
            }
            depth += 1;
            current = link.source;
        }
        depth
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
