//! Column layout: a small stand-in for an external Sankey layout routine.
//!
//! Nodes are placed in columns by depth and sized by value with one vertical
//! scale shared by all columns. Links leave and enter nodes stacked in
//! snapshot order.

use std::collections::{BTreeMap, HashMap};

use tracing::instrument;

use crate::config::LayoutSettings;
use crate::domain::{Layout, LinkGeometry, NodeGeometry, NodeId, Snapshot};
use crate::infrastructure::traits::LayoutEngine;

/// Horizontal inset of the drawing extent.
const INSET_X: f64 = 1.0;
/// Vertical inset of the drawing extent.
const INSET_Y: f64 = 5.0;

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnLayout {
    pub width: f64,
    pub height: f64,
    pub node_width: f64,
    pub node_padding: f64,
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self::from(&LayoutSettings::default())
    }
}

impl From<&LayoutSettings> for ColumnLayout {
    fn from(settings: &LayoutSettings) -> Self {
        Self {
            width: settings.width,
            height: settings.height,
            node_width: settings.node_width,
            node_padding: settings.node_padding,
        }
    }
}

impl ColumnLayout {
    fn columns(snapshot: &Snapshot) -> BTreeMap<usize, Vec<NodeId>> {
        let mut columns: BTreeMap<usize, Vec<NodeId>> = BTreeMap::new();
        for node in &snapshot.nodes {
            columns
                .entry(snapshot.depth_of(node.id))
                .or_default()
                .push(node.id);
        }
        columns
    }

    /// Largest scale that fits every column inside the extent.
    fn vertical_scale(&self, snapshot: &Snapshot, columns: &BTreeMap<usize, Vec<NodeId>>) -> f64 {
        let available = (self.height - 2.0 * INSET_Y).max(0.0);
        let ky = columns
            .values()
            .filter_map(|column| {
                let total: f64 = column.iter().map(|&id| snapshot.value_of(id)).sum();
                if total <= 0.0 {
                    return None;
                }
                let gaps = self.node_padding * (column.len() as f64 - 1.0);
                Some((available - gaps).max(0.0) / total)
            })
            .fold(f64::INFINITY, f64::min);
        if ky.is_finite() {
            ky
        } else {
            0.0
        }
    }
}

impl LayoutEngine for ColumnLayout {
    #[instrument(level = "debug", skip_all)]
    fn layout(&self, snapshot: &Snapshot) -> Layout {
        let mut layout = Layout::default();
        if snapshot.is_empty() {
            return layout;
        }

        let columns = Self::columns(snapshot);
        let ky = self.vertical_scale(snapshot, &columns);
        let max_depth = columns.keys().copied().max().unwrap_or(0);
        let kx = if max_depth == 0 {
            0.0
        } else {
            (self.width - 2.0 * INSET_X - self.node_width).max(0.0) / max_depth as f64
        };
        let available = (self.height - 2.0 * INSET_Y).max(0.0);

        for (&depth, column) in &columns {
            let heights: Vec<f64> = column
                .iter()
                .map(|&id| snapshot.value_of(id) * ky)
                .collect();
            let used = heights.iter().sum::<f64>()
                + self.node_padding * (column.len() as f64 - 1.0);
            let mut y = INSET_Y + ((available - used) / 2.0).max(0.0);
            let x0 = INSET_X + depth as f64 * kx;

            for (&id, &h) in column.iter().zip(&heights) {
                layout.nodes.insert(
                    id,
                    NodeGeometry {
                        x0,
                        x1: x0 + self.node_width,
                        y0: y,
                        y1: y + h,
                    },
                );
                y += h + self.node_padding;
            }
        }

        let mut out_offset: HashMap<NodeId, f64> = HashMap::new();
        let mut in_offset: HashMap<NodeId, f64> = HashMap::new();
        for link in &snapshot.links {
            let (Some(source), Some(target)) =
                (layout.nodes.get(&link.source), layout.nodes.get(&link.target))
            else {
                continue;
            };
            let width = link.value * ky;
            let out = out_offset.entry(link.source).or_insert(0.0);
            let inc = in_offset.entry(link.target).or_insert(0.0);
            let geometry = LinkGeometry {
                width,
                y0: source.y0 + *out + width / 2.0,
                y1: target.y0 + *inc + width / 2.0,
            };
            *out += width;
            *inc += width;
            layout.links.insert(link.key.clone(), geometry);
        }

        layout
    }
}
