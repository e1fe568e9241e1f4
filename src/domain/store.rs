use generational_arena::Arena;
use tracing::instrument;

use crate::domain::entities::{Link, LinkKey, Node, NodeId};

/// Arena-backed store owning every node and link of one hierarchy.
///
/// Node order is the insertion order and is what every listing follows.
/// Links reference nodes by handle; a link never outlives either endpoint.
#[derive(Debug, Default)]
pub struct TreeStore {
    /// Arena storage for all nodes
    arena: Arena<Node>,
    /// Insertion order of live nodes
    order: Vec<NodeId>,
    links: Vec<Link>,
}

impl TreeStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[instrument(level = "trace", skip(self))]
    pub fn insert_node(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.arena.insert(node));
        self.order.push(id);
        id
    }

    /// Append a link. Both endpoints must be live.
    #[instrument(level = "trace", skip(self))]
    pub fn insert_link(&mut self, link: Link) {
        debug_assert!(self.node(link.source).is_some() && self.node(link.target).is_some());
        self.links.push(link);
    }

    /// Delete a node and every link touching it.
    #[instrument(level = "trace", skip(self))]
    pub fn remove_node(&mut self, id: NodeId) -> Option<Node> {
        let node = self.arena.remove(id.0)?;
        self.order.retain(|&n| n != id);
        self.links.retain(|l| l.source != id && l.target != id);
        Some(node)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.arena.get(id.0)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.arena.get_mut(id.0)
    }

    pub fn name_of(&self, id: NodeId) -> Option<&str> {
        self.node(id).map(|n| n.name.as_str())
    }

    /// First node, in store order, whose name matches case-insensitively.
    #[instrument(level = "trace", skip(self))]
    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.nodes()
            .find(|(_, node)| node.matches(name))
            .map(|(id, _)| id)
    }

    /// Nodes in store order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        self.order
            .iter()
            .filter_map(move |&id| self.arena.get(id.0).map(|node| (id, node)))
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn links_mut(&mut self) -> impl Iterator<Item = &mut Link> + '_ {
        self.links.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn roots(&self) -> Vec<NodeId> {
        self.nodes()
            .filter(|(_, node)| node.is_root())
            .map(|(id, _)| id)
            .collect()
    }

    /// Direct children of `name` in store order, synthetic ones included.
    #[instrument(level = "trace", skip(self))]
    pub fn children_of(&self, name: &str) -> Vec<NodeId> {
        self.nodes()
            .filter(|(_, node)| node.is_child_of(name))
            .map(|(id, _)| id)
            .collect()
    }

    /// The synthetic "Other" child of `name`, if one exists.
    pub fn other_of(&self, name: &str) -> Option<NodeId> {
        self.nodes()
            .find(|(_, node)| node.synthetic && node.is_child_of(name))
            .map(|(id, _)| id)
    }

    pub fn link_between(&self, source: NodeId, target: NodeId) -> Option<&Link> {
        self.links
            .iter()
            .find(|l| l.source == source && l.target == target)
    }

    pub fn link_between_mut(&mut self, source: NodeId, target: NodeId) -> Option<&mut Link> {
        self.links
            .iter_mut()
            .find(|l| l.source == source && l.target == target)
    }

    pub fn link_key(&self, link: &Link) -> Option<LinkKey> {
        Some(LinkKey::new(
            self.name_of(link.source)?,
            self.name_of(link.target)?,
        ))
    }

    /// Every currently visible descendant of `id`, depth-first preorder.
    ///
    /// Descent stops at hidden nodes: a hidden child's subtree is not reported.
    #[instrument(level = "debug", skip(self))]
    pub fn visible_descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut found = Vec::new();
        if let Some(node) = self.node(id) {
            self.collect_visible(&node.name, &mut found);
        }
        found
    }

    fn collect_visible(&self, name: &str, found: &mut Vec<NodeId>) {
        for child in self.children_of(name) {
            let Some(node) = self.node(child) else {
                continue;
            };
            if !node.is_visible || found.contains(&child) {
                continue;
            }
            found.push(child);
            self.collect_visible(&node.name, found);
        }
    }

    /// Number of levels below and including the deepest root.
    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        self.roots()
            .into_iter()
            .map(|root| self.calculate_depth(root))
            .max()
            .unwrap_or(0)
    }

    fn calculate_depth(&self, id: NodeId) -> usize {
        match self.node(id) {
            Some(node) => {
                1 + self
                    .children_of(&node.name)
                    .into_iter()
                    .map(|child| self.calculate_depth(child))
                    .max()
                    .unwrap_or(0)
            }
            None => 0,
        }
    }
}
