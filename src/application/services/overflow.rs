//! Overflow aggregation: folds siblings beyond the fan-out limit into one "Other" node.

use tracing::debug;

use crate::domain::{Link, Node, NodeId, TreeStore};

/// Fold `suppressed` children of `parent` into its synthetic "Other" node.
///
/// The aggregate edge carries the sum of the suppressed children's edge values.
/// At most one "Other" exists per parent: an existing one is reused, its value
/// refreshed and made visible again. Returns the handle of the "Other" node.
pub fn aggregate_overflow(
    store: &mut TreeStore,
    parent: NodeId,
    suppressed: &[NodeId],
) -> Option<NodeId> {
    let parent_name = store.name_of(parent)?.to_string();

    let total: f64 = store
        .links()
        .iter()
        .filter(|l| l.source == parent && suppressed.contains(&l.target))
        .map(|l| l.value)
        .sum();

    let other = match store.other_of(&parent_name) {
        Some(existing) => {
            debug!("aggregate_overflow: reusing Other under {}", parent_name);
            if let Some(node) = store.node_mut(existing) {
                node.is_visible = true;
            }
            existing
        }
        None => {
            debug!(
                "aggregate_overflow: folding {} children of {} into Other",
                suppressed.len(),
                parent_name
            );
            store.insert_node(Node::other(parent_name.clone()))
        }
    };

    match store.link_between_mut(parent, other) {
        Some(link) => {
            link.value = total;
            link.is_visible = true;
        }
        None => {
            let mut link = Link::new(parent, other, total);
            link.is_visible = true;
            store.insert_link(link);
        }
    }

    Some(other)
}
