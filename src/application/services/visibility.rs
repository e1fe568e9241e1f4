//! Visibility engine
//!
//! Owns the tree store and applies expand/collapse actions to it. Every action
//! returns the projected snapshot of what is visible afterwards.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::services::overflow::aggregate_overflow;
use crate::domain::{Action, LinkKey, NodeId, Snapshot, TreeStore};
use crate::infrastructure::traits::LinkCache;

/// Default number of children shown individually before folding into "Other".
pub const DEFAULT_FAN_OUT_LIMIT: usize = 3;

/// Service mutating node and link visibility of one tree store.
///
/// Mutations take `&mut self`, so calls against one store are serialized.
pub struct VisibilityService {
    store: TreeStore,
    fan_out_limit: usize,
    link_cache: Arc<dyn LinkCache>,
}

impl VisibilityService {
    /// Create a visibility service over a freshly built store.
    pub fn new(store: TreeStore, link_cache: Arc<dyn LinkCache>) -> Self {
        Self {
            store,
            fan_out_limit: DEFAULT_FAN_OUT_LIMIT,
            link_cache,
        }
    }

    /// Override the fan-out limit; values below 1 are raised to 1.
    pub fn with_fan_out_limit(mut self, limit: usize) -> Self {
        self.fan_out_limit = limit.max(1);
        self
    }

    pub fn fan_out_limit(&self) -> usize {
        self.fan_out_limit
    }

    pub fn store(&self) -> &TreeStore {
        &self.store
    }

    pub fn into_store(self) -> TreeStore {
        self.store
    }

    /// Current visible subgraph.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::project(&self.store)
    }

    /// Reveal `name` and its direct children plus the edges to them.
    ///
    /// Unknown names leave the store untouched. When the node has more children
    /// than the fan-out limit only the first one (store order) is shown and the
    /// rest are folded into a single "Other" node.
    #[instrument(level = "debug", skip(self))]
    pub fn expand(&mut self, name: &str) -> Snapshot {
        let Some(id) = self.store.find(name) else {
            debug!("expand: no node named {}", name);
            return self.snapshot();
        };
        let node_name = match self.store.node_mut(id) {
            Some(node) => {
                node.is_visible = true;
                node.name.clone()
            }
            None => return self.snapshot(),
        };

        let children: Vec<NodeId> = self
            .store
            .children_of(&node_name)
            .into_iter()
            .filter(|&c| self.store.node(c).is_some_and(|n| !n.synthetic))
            .collect();
        debug!("expand: {} has {} children", node_name, children.len());

        match children.split_first() {
            Some((&first, rest)) if children.len() > self.fan_out_limit => {
                self.set_visible(first, true);
                if let Some(link) = self.store.link_between_mut(id, first) {
                    link.is_visible = true;
                }
                aggregate_overflow(&mut self.store, id, rest);
            }
            _ => self.reveal_children(id, &children),
        }

        self.snapshot()
    }

    fn reveal_children(&mut self, id: NodeId, children: &[NodeId]) {
        for &child in children {
            self.set_visible(child, true);
        }
        let visible: HashSet<NodeId> = self
            .store
            .nodes()
            .filter(|(_, n)| n.is_visible)
            .map(|(id, _)| id)
            .collect();
        for link in self.store.links_mut() {
            if link.source == id && visible.contains(&link.target) {
                link.is_visible = true;
            }
        }
    }

    /// Hide every visible descendant of `name` and the edges leaving them.
    ///
    /// `name` itself stays visible. Synthetic "Other" nodes under it are deleted
    /// together with their edges. Links that stop being visible are forgotten
    /// by the link cache.
    #[instrument(level = "debug", skip(self))]
    pub fn collapse(&mut self, name: &str) -> Snapshot {
        let Some(id) = self.store.find(name) else {
            debug!("collapse: no node named {}", name);
            return self.snapshot();
        };

        let gathered = self.store.visible_descendants(id);
        let closing: HashSet<NodeId> = gathered.iter().copied().chain([id]).collect();
        debug!("collapse: hiding {} descendants", gathered.len());

        let forgotten: Vec<LinkKey> = self
            .store
            .links()
            .iter()
            .filter(|l| l.is_visible && closing.contains(&l.source))
            .filter_map(|l| self.store.link_key(l))
            .collect();

        let mut synthetic = Vec::new();
        for &node_id in &gathered {
            match self.store.node(node_id).map(|n| n.synthetic) {
                Some(true) => synthetic.push(node_id),
                Some(false) => self.set_visible(node_id, false),
                None => {}
            }
        }
        for link in self.store.links_mut() {
            if closing.contains(&link.source) {
                link.is_visible = false;
            }
        }
        for other in synthetic {
            self.store.remove_node(other);
        }

        for key in &forgotten {
            self.link_cache.forget(key);
        }
        self.snapshot()
    }

    /// Click behaviour: collapse an expanded node, expand any other.
    ///
    /// Roots are never collapsed this way.
    #[instrument(level = "debug", skip(self))]
    pub fn toggle(&mut self, name: &str) -> Snapshot {
        let Some(id) = self.store.find(name) else {
            return self.snapshot();
        };
        if !self.is_expanded_id(id) {
            return self.expand(name);
        }
        if self.store.node(id).is_some_and(|n| n.is_root()) {
            debug!("toggle: root {} stays open", name);
            return self.snapshot();
        }
        self.collapse(name)
    }

    /// Whether `name` currently shows any outgoing link.
    pub fn is_expanded(&self, name: &str) -> bool {
        self.store
            .find(name)
            .is_some_and(|id| self.is_expanded_id(id))
    }

    /// Initial render: expand `root`, or every root when none is given.
    pub fn reveal_initial(&mut self, root: Option<&str>) -> Snapshot {
        match root {
            Some(name) => self.expand(name),
            None => {
                let roots: Vec<String> = self
                    .store
                    .roots()
                    .into_iter()
                    .filter_map(|id| self.store.name_of(id).map(str::to_string))
                    .collect();
                for name in &roots {
                    self.expand(name);
                }
                self.snapshot()
            }
        }
    }

    pub fn apply(&mut self, action: &Action) -> Snapshot {
        match action {
            Action::Expand(name) => self.expand(name),
            Action::Collapse(name) => self.collapse(name),
            Action::Toggle(name) => self.toggle(name),
        }
    }

    fn is_expanded_id(&self, id: NodeId) -> bool {
        self.store
            .links()
            .iter()
            .any(|l| l.is_visible && l.source == id)
    }

    fn set_visible(&mut self, id: NodeId, visible: bool) {
        if let Some(node) = self.store.node_mut(id) {
            node.is_visible = visible;
        }
    }
}
