//! Positioned geometry, kept apart from the domain nodes it describes.

use std::collections::HashMap;

use serde::Serialize;

use crate::domain::entities::{LinkKey, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NodeGeometry {
    pub x0: f64,
    pub x1: f64,
    pub y0: f64,
    pub y1: f64,
}

impl NodeGeometry {
    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }
}

/// Band of a link: stroke width plus the vertical centre at each end.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinkGeometry {
    pub width: f64,
    pub y0: f64,
    pub y1: f64,
}

/// Geometry for one snapshot, keyed by node handle and link key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Layout {
    pub nodes: HashMap<NodeId, NodeGeometry>,
    pub links: HashMap<LinkKey, LinkGeometry>,
}

impl Layout {
    pub fn node(&self, id: NodeId) -> Option<&NodeGeometry> {
        self.nodes.get(&id)
    }

    pub fn link(&self, key: &LinkKey) -> Option<&LinkGeometry> {
        self.links.get(key)
    }
}
