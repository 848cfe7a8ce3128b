//! Square-tiling construction.
//!
//! The discrete analogue of the classical squared-rectangle construction
//! from a planar electrical embedding: after an equilibrium pass has
//! spread the graph left-to-right, every edge becomes a square whose side
//! is the horizontal extent of the edge, and every node becomes a vertical
//! segment shared by the squares of its incident edges.
//!
//! The construction is two-phase: `create_square_tiling` only computes
//! the squares, the segments, and the node y positions it proposes, and
//! `SquareTiling::apply_positions` is the explicit write-back. Callers
//! that want the relayout apply it; callers that only want the picture
//! don't.

use std::collections::BTreeMap;

use log::debug;
use rand::Rng;
use serde::Serialize;

use crate::error::GraphError;
use crate::graph::{GraphStore, NodeId};

/// One square of the tiling, spanning `[x, x+size] × [y, y+size]`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Square {
    /// Side length: the horizontal extent of the edge this square encodes.
    pub size: f64,
    /// Left edge.
    pub x: f64,
    /// Bottom edge.
    pub y: f64,
    /// Random pastel fill, as a CSS hsl() string.
    pub color: String,
    /// The edge's left endpoint.
    pub node_id1: NodeId,
    /// The edge's right endpoint.
    pub node_id2: NodeId,
}

/// The vertical segment a node occupies in the tiling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerticalSegment {
    pub y1: f64,
    pub y2: f64,
}

/// Output of the tiling construction.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SquareTiling {
    /// One square per edge with a strictly-right neighbor.
    pub squares: Vec<Square>,
    /// Per-node vertical segment.
    pub segments: BTreeMap<NodeId, VerticalSegment>,
    /// Proposed node y positions (segment midpoints). Not yet applied.
    pub positions: BTreeMap<NodeId, f64>,
}

impl SquareTiling {
    /// Write the proposed y positions back onto the graph.
    pub fn apply_positions(&self, graph: &mut GraphStore) {
        for (&id, &y) in &self.positions {
            if let Some(node) = graph.node_mut(id) {
                node.y = y;
            }
        }
    }
}

/// Prepare the nailed boundary for a tiling run.
///
/// Requires at least two nailed nodes, else `DegenerateState` with the
/// graph unchanged. The first nailed node and the one at index ⌊k/2⌋
/// become the left and right poles; every other nailed node is un-nailed
/// but has its y fixed to one of two levels, seeding the Dirichlet data
/// for the equilibrium pass that follows.
pub fn setup_graph_for_tiling(graph: &mut GraphStore) -> Result<(), GraphError> {
    let nailed: Vec<NodeId> = graph
        .nodes()
        .filter(|(_, node)| node.is_nailed())
        .map(|(id, _)| id)
        .collect();
    let k = nailed.len();
    if k < 2 {
        return Err(GraphError::DegenerateState(
            "tiling setup needs at least two nailed nodes",
        ));
    }
    debug!("setting up tiling boundary over {} nailed nodes", k);

    let left = nailed[0];
    let right = nailed[k / 2];
    if let Some(node) = graph.node_mut(left) {
        node.x = -1.0;
        node.y = -0.8;
    }
    if let Some(node) = graph.node_mut(right) {
        node.x = 1.0;
        node.y = -0.8;
    }

    for (index, &id) in nailed.iter().enumerate() {
        if id == left || id == right {
            continue;
        }
        if let Some(node) = graph.node_mut(id) {
            node.flags.set_nailed(false);
            node.y = if 2 * index < k { -0.6 } else { -1.0 };
            node.flags.set_fixed_y(true);
        }
    }
    Ok(())
}

/// Build the square tiling from the current (equilibrated) embedding.
///
/// Nodes are processed in ascending x order. Each node walks its
/// strictly-later neighbors in ascending edge-slope order with a running
/// height cursor, emitting one square per edge and folding the cursor into
/// the neighbor's bottom height. A node with later neighbors lands at the
/// midpoint of its segment; one without inherits the leftmost node's
/// position and segment verbatim.
pub fn create_square_tiling<R: Rng>(
    graph: &GraphStore,
    rng: &mut R,
) -> Result<SquareTiling, GraphError> {
    if graph.node_count() == 0 {
        return Err(GraphError::DegenerateState("empty graph"));
    }

    // Snapshot the embedding; the compute phase never touches the graph.
    let mut order: Vec<(NodeId, f64, f64)> =
        graph.nodes().map(|(id, node)| (id, node.x, node.y)).collect();
    order.sort_by(|a, b| a.1.total_cmp(&b.1));

    let mut tiling = SquareTiling {
        squares: Vec::new(),
        segments: BTreeMap::new(),
        positions: BTreeMap::new(),
    };

    // Bottom height of the square for the lowest rightward edge of each node.
    let mut heights: BTreeMap<NodeId, f64> = BTreeMap::new();
    let (leftmost_id, _, leftmost_y) = order[0];
    heights.insert(leftmost_id, -1.0);
    tiling.segments.insert(
        leftmost_id,
        VerticalSegment {
            y1: -1.0,
            y2: 2.0 * leftmost_y,
        },
    );

    for &(id, x, y) in &order {
        let mut later: Vec<(NodeId, f64, f64)> = graph
            .edges_at(id)
            .filter_map(|(_, other_id, _)| {
                let other = graph.node(other_id)?;
                (other.x > x).then_some((other_id, other.x, other.y))
            })
            .collect();
        later.sort_by(|a, b| {
            let slope_a = (a.2 - y) / (a.1 - x);
            let slope_b = (b.2 - y) / (b.1 - x);
            slope_a.total_cmp(&slope_b)
        });

        let bottom = heights.get(&id).copied().unwrap_or(-1.0);
        let mut cursor = bottom;
        for &(other_id, other_x, _) in &later {
            let size = other_x - x;
            heights
                .entry(other_id)
                .and_modify(|h| *h = h.min(cursor))
                .or_insert(cursor);
            tiling.squares.push(Square {
                size,
                x,
                y: cursor,
                color: pastel_color(rng),
                node_id1: id,
                node_id2: other_id,
            });
            cursor += size;
        }

        if later.is_empty() {
            // Inherit the leftmost node's (possibly already relocated)
            // position and segment.
            let inherited_y = tiling
                .positions
                .get(&leftmost_id)
                .copied()
                .unwrap_or(leftmost_y);
            tiling.positions.insert(id, inherited_y);
            let segment = tiling.segments[&leftmost_id];
            tiling.segments.insert(id, segment);
        } else {
            tiling.positions.insert(id, (bottom + cursor) / 2.0);
            tiling
                .segments
                .insert(id, VerticalSegment { y1: bottom, y2: cursor });
        }
    }

    debug!("square tiling: {} squares", tiling.squares.len());
    Ok(tiling)
}

/// A random pastel, matching the host's palette conventions.
fn pastel_color<R: Rng>(rng: &mut R) -> String {
    format!("hsl({}, 100%, 85%)", rng.gen_range(0u32..360))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Edge, Node};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    /// Total square area must fill the bounding rectangle exactly.
    fn assert_area_conserved(tiling: &SquareTiling) {
        let total: f64 = tiling.squares.iter().map(|s| s.size * s.size).sum();
        let min_x = tiling.squares.iter().map(|s| s.x).fold(f64::INFINITY, f64::min);
        let max_x = tiling
            .squares
            .iter()
            .map(|s| s.x + s.size)
            .fold(f64::NEG_INFINITY, f64::max);
        let min_y = tiling.squares.iter().map(|s| s.y).fold(f64::INFINITY, f64::min);
        let max_y = tiling
            .squares
            .iter()
            .map(|s| s.y + s.size)
            .fold(f64::NEG_INFINITY, f64::max);
        let bounding = (max_x - min_x) * (max_y - min_y);
        assert!(
            (total - bounding).abs() < 1e-9,
            "area {} != bounding {}",
            total,
            bounding
        );
    }

    #[test]
    fn test_setup_requires_two_nailed() {
        let mut graph = GraphStore::new();
        let a = graph.add_node(Node::nailed_at(0.5, 0.5));
        let b = graph.add_node(Node::at(0.3, 0.3));

        let err = setup_graph_for_tiling(&mut graph).unwrap_err();
        assert!(matches!(err, GraphError::DegenerateState(_)));

        // Unchanged on failure.
        assert_eq!(graph.node(a).map(|n| (n.x, n.y)), Some((0.5, 0.5)));
        assert!(graph.node(a).unwrap().is_nailed());
        assert!(!graph.node(b).unwrap().is_fixed_y());
    }

    #[test]
    fn test_setup_places_poles() {
        let mut graph = GraphStore::new();
        let a = graph.add_node(Node::nailed_at(0.0, 0.0));
        let b = graph.add_node(Node::nailed_at(0.0, 0.0));

        setup_graph_for_tiling(&mut graph).unwrap();

        assert_eq!(graph.node(a).map(|n| (n.x, n.y)), Some((-1.0, -0.8)));
        assert_eq!(graph.node(b).map(|n| (n.x, n.y)), Some((1.0, -0.8)));
        assert!(graph.node(a).unwrap().is_nailed());
        assert!(graph.node(b).unwrap().is_nailed());
    }

    #[test]
    fn test_setup_unnails_and_levels_the_rest() {
        let mut graph = GraphStore::new();
        let ids: Vec<_> = (0..5)
            .map(|_| graph.add_node(Node::nailed_at(0.0, 0.0)))
            .collect();

        setup_graph_for_tiling(&mut graph).unwrap();

        // Poles: index 0 and index 5/2 = 2.
        assert!(graph.node(ids[0]).unwrap().is_nailed());
        assert!(graph.node(ids[2]).unwrap().is_nailed());

        // First half to -0.6, second half to -1, all y-fixed.
        let n1 = graph.node(ids[1]).unwrap();
        assert!(!n1.is_nailed());
        assert!(n1.is_fixed_y());
        assert_eq!(n1.y, -0.6);

        let n3 = graph.node(ids[3]).unwrap();
        assert_eq!(n3.y, -1.0);
        let n4 = graph.node(ids[4]).unwrap();
        assert_eq!(n4.y, -1.0);
    }

    #[test]
    fn test_empty_graph_degenerate() {
        let graph = GraphStore::new();
        assert!(matches!(
            create_square_tiling(&graph, &mut rng()),
            Err(GraphError::DegenerateState(_))
        ));
    }

    #[test]
    fn test_path_tiling() {
        // A path equilibrated to x = -1, 0, 1 at the boundary level tiles a
        // 2 x 1 rectangle with two unit squares.
        let mut graph = GraphStore::new();
        let a = graph.add_node(Node::nailed_at(-1.0, -0.8));
        let b = graph.add_node(Node::at(0.0, -0.8));
        let c = graph.add_node(Node::nailed_at(1.0, -0.8));
        graph.add_edge(a, b, Edge::default()).unwrap();
        graph.add_edge(b, c, Edge::default()).unwrap();

        let tiling = create_square_tiling(&graph, &mut rng()).unwrap();

        assert_eq!(tiling.squares.len(), 2);
        assert_area_conserved(&tiling);

        let first = &tiling.squares[0];
        assert_eq!((first.size, first.x, first.y), (1.0, -1.0, -1.0));
        assert_eq!((first.node_id1, first.node_id2), (a, b));
        let second = &tiling.squares[1];
        assert_eq!((second.size, second.x, second.y), (1.0, 0.0, -1.0));

        // Interior node sits at the midpoint of its segment.
        assert_eq!(tiling.positions[&b], -0.5);
        assert_eq!(tiling.segments[&b], VerticalSegment { y1: -1.0, y2: 0.0 });

        // The rightmost node has no later neighbors: it inherits the
        // leftmost node's relocated position and segment.
        assert_eq!(tiling.positions[&c], tiling.positions[&a]);
        assert_eq!(tiling.segments[&c], tiling.segments[&a]);
    }

    #[test]
    fn test_four_cycle_tiles_two_by_two() {
        // The 4-cycle with poles at x = ±1 and both interior nodes at x = 0
        // is the classic dissection of a 2 x 2 square into four unit squares.
        let mut graph = GraphStore::new();
        let a = graph.add_node(Node::nailed_at(-1.0, -0.8));
        let b = graph.add_node(Node::at(0.0, -0.8));
        let c = graph.add_node(Node::nailed_at(1.0, -0.8));
        let d = graph.add_node(Node::at(0.0, -0.8));
        graph.add_edge(a, b, Edge::default()).unwrap();
        graph.add_edge(b, c, Edge::default()).unwrap();
        graph.add_edge(c, d, Edge::default()).unwrap();
        graph.add_edge(d, a, Edge::default()).unwrap();

        let tiling = create_square_tiling(&graph, &mut rng()).unwrap();

        assert_eq!(tiling.squares.len(), 4);
        assert!(tiling.squares.iter().all(|s| (s.size - 1.0).abs() < 1e-12));
        assert_area_conserved(&tiling);

        // Two stacked squares start at x = -1, two at x = 0.
        let mut origins: Vec<(f64, f64)> =
            tiling.squares.iter().map(|s| (s.x, s.y)).collect();
        origins.sort_by(|p, q| p.0.total_cmp(&q.0).then(p.1.total_cmp(&q.1)));
        assert_eq!(
            origins,
            vec![(-1.0, -1.0), (-1.0, 0.0), (0.0, -1.0), (0.0, 0.0)]
        );
    }

    #[test]
    fn test_apply_positions() {
        let mut graph = GraphStore::new();
        let a = graph.add_node(Node::nailed_at(-1.0, -0.8));
        let b = graph.add_node(Node::at(0.0, -0.8));
        let c = graph.add_node(Node::nailed_at(1.0, -0.8));
        graph.add_edge(a, b, Edge::default()).unwrap();
        graph.add_edge(b, c, Edge::default()).unwrap();

        let tiling = create_square_tiling(&graph, &mut rng()).unwrap();
        // Compute phase left the graph alone.
        assert_eq!(graph.node(b).map(|n| n.y), Some(-0.8));

        tiling.apply_positions(&mut graph);
        assert_eq!(graph.node(b).map(|n| n.y), Some(-0.5));
    }

    #[test]
    fn test_pastel_color_format() {
        let color = pastel_color(&mut rng());
        assert!(color.starts_with("hsl("));
        assert!(color.ends_with(", 100%, 85%)"));
    }
}
