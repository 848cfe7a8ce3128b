//! R-tree based spatial index using the rstar crate.
//!
//! Backs pointer picking: the host resolves a pointer position to the node
//! to grab (and then re-equilibrates around it while it is dragged). The
//! index is a snapshot — rebuild it after bulk position changes.

use rstar::{PointDistance, RTree, RTreeObject, AABB};

use crate::graph::NodeId;

/// A point in the spatial index with its node id.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodePoint {
    /// The node identifier.
    pub id: NodeId,
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
}

impl NodePoint {
    /// Create a new NodePoint.
    pub fn new(id: NodeId, x: f64, y: f64) -> Self {
        Self { id, x, y }
    }
}

impl RTreeObject for NodePoint {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.x, self.y])
    }
}

impl PointDistance for NodePoint {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.x - point[0];
        let dy = self.y - point[1];
        dx * dx + dy * dy
    }
}

/// Spatial index over node positions.
pub struct SpatialIndex {
    tree: RTree<NodePoint>,
}

impl SpatialIndex {
    /// Create a new empty spatial index.
    pub fn new() -> Self {
        Self { tree: RTree::new() }
    }

    /// Find the nearest node to a point.
    pub fn nearest(&self, x: f64, y: f64) -> Option<NodeId> {
        self.tree.nearest_neighbor(&[x, y]).map(|point| point.id)
    }

    /// Find the nearest node within a maximum distance.
    pub fn nearest_within(&self, x: f64, y: f64, max_distance: f64) -> Option<NodeId> {
        self.tree
            .nearest_neighbor(&[x, y])
            .filter(|point| point.distance_2(&[x, y]) <= max_distance * max_distance)
            .map(|point| point.id)
    }

    /// Rebuild the index from a list of (id, x, y) tuples.
    ///
    /// Bulk loading beats incremental inserts for whole-graph refreshes.
    pub fn rebuild(&mut self, points: &[(NodeId, f64, f64)]) {
        let node_points: Vec<_> = points
            .iter()
            .map(|&(id, x, y)| NodePoint::new(id, x, y))
            .collect();
        self.tree = RTree::bulk_load(node_points);
    }

    /// Clear all nodes from the index.
    pub fn clear(&mut self) {
        self.tree = RTree::new();
    }

    /// Get the number of indexed nodes.
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Check if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::new()
    }
}
