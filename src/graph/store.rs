//! GraphStore - Core graph data structure.
//!
//! The store keeps the topology in petgraph's StableGraph and maps stable
//! public ids to the internal indices. Stable indices double as the edge
//! handles the rest of the kernel relies on: removal is by handle identity,
//! so parallel edges between the same pair stay individually addressable.

use petgraph::Undirected;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableGraph};
use petgraph::visit::EdgeRef;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use log::debug;

use super::edge::{Edge, EdgeId};
use super::node::{Node, NodeId};
use crate::error::GraphError;

/// The core graph store.
///
/// This struct manages:
/// - Undirected topology via petgraph (node and edge records as weights)
/// - ID mapping between stable ids and internal indices
/// - Deterministic node iteration in ascending-id order (for a loaded
///   graph this equals the order of rows in the file)
#[derive(Debug)]
pub struct GraphStore {
    /// The underlying graph structure.
    graph: StableGraph<Node, Edge, Undirected>,

    /// Map from stable NodeId to petgraph NodeIndex, ordered by id.
    node_id_to_index: BTreeMap<NodeId, NodeIndex>,

    /// Reverse map from petgraph NodeIndex to stable NodeId.
    node_index_to_id: HashMap<NodeIndex, NodeId>,

    /// Map from stable EdgeId to petgraph EdgeIndex.
    edge_id_to_index: HashMap<EdgeId, EdgeIndex>,

    /// Reverse map from petgraph EdgeIndex to stable EdgeId.
    edge_index_to_id: HashMap<EdgeIndex, EdgeId>,

    /// Next node ID to assign.
    next_node_id: u32,

    /// Next edge ID to assign.
    next_edge_id: u32,
}

impl GraphStore {
    /// Create a new empty graph store.
    pub fn new() -> Self {
        Self {
            graph: StableGraph::default(),
            node_id_to_index: BTreeMap::new(),
            node_index_to_id: HashMap::new(),
            edge_id_to_index: HashMap::new(),
            edge_index_to_id: HashMap::new(),
            next_node_id: 0,
            next_edge_id: 0,
        }
    }

    /// Create a graph store with pre-allocated capacity.
    pub fn with_capacity(node_capacity: usize, edge_capacity: usize) -> Self {
        Self {
            graph: StableGraph::with_capacity(node_capacity, edge_capacity),
            node_id_to_index: BTreeMap::new(),
            node_index_to_id: HashMap::with_capacity(node_capacity),
            edge_id_to_index: HashMap::with_capacity(edge_capacity),
            edge_index_to_id: HashMap::with_capacity(edge_capacity),
            next_node_id: 0,
            next_edge_id: 0,
        }
    }

    // =========================================================================
    // Node Operations
    // =========================================================================

    /// Add a node, assigning it the next free id. O(log n).
    pub fn add_node(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.next_node_id);
        self.next_node_id += 1;

        let index = self.graph.add_node(node);
        self.node_id_to_index.insert(id, index);
        self.node_index_to_id.insert(index, id);

        debug!("added node {}", id);
        id
    }

    /// Remove a node and all its incident edges. O(degree).
    ///
    /// Returns true if the node existed and was removed.
    pub fn delete_node(&mut self, id: NodeId) -> bool {
        let Some(index) = self.node_id_to_index.remove(&id) else {
            return false;
        };
        self.node_index_to_id.remove(&index);

        // Cascade: drop every incident edge handle before the node goes.
        let incident: Vec<EdgeIndex> = self.graph.edges(index).map(|e| e.id()).collect();
        for edge_index in incident {
            if let Some(edge_id) = self.edge_index_to_id.remove(&edge_index) {
                self.edge_id_to_index.remove(&edge_id);
            }
        }

        self.graph.remove_node(index);
        debug!("deleted node {}", id);
        true
    }

    /// Get a node by id.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.node_id_to_index
            .get(&id)
            .and_then(|&index| self.graph.node_weight(index))
    }

    /// Get a mutable node by id.
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        match self.node_id_to_index.get(&id) {
            Some(&index) => self.graph.node_weight_mut(index),
            None => None,
        }
    }

    /// Get the number of nodes.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Iterate node ids in ascending order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.node_id_to_index.keys().copied()
    }

    /// Iterate (id, node) pairs in ascending id order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        self.node_id_to_index
            .iter()
            .filter_map(|(&id, &index)| self.graph.node_weight(index).map(|node| (id, node)))
    }

    // =========================================================================
    // Edge Operations
    // =========================================================================

    /// Add an undirected edge between two nodes.
    ///
    /// Fails with `ConstraintViolation` if either endpoint is unknown; no
    /// dangling edge is ever created. Parallel edges are permitted.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId, edge: Edge) -> Result<EdgeId, GraphError> {
        let from_index = *self
            .node_id_to_index
            .get(&from)
            .ok_or(GraphError::ConstraintViolation(from))?;
        let to_index = *self
            .node_id_to_index
            .get(&to)
            .ok_or(GraphError::ConstraintViolation(to))?;

        let id = EdgeId(self.next_edge_id);
        self.next_edge_id += 1;

        let index = self.graph.add_edge(from_index, to_index, edge);
        self.edge_id_to_index.insert(id, index);
        self.edge_index_to_id.insert(index, id);

        Ok(id)
    }

    /// Remove an edge by its handle.
    ///
    /// Identity semantics: with parallel edges present, exactly the edge
    /// carrying this handle goes away.
    pub fn delete_edge(&mut self, id: EdgeId) -> bool {
        if let Some(index) = self.edge_id_to_index.remove(&id) {
            self.edge_index_to_id.remove(&index);
            self.graph.remove_edge(index);
            true
        } else {
            false
        }
    }

    /// Get an edge record by handle.
    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edge_id_to_index
            .get(&id)
            .and_then(|&index| self.graph.edge_weight(index))
    }

    /// Get an edge's endpoint ids by handle.
    pub fn edge_endpoints(&self, id: EdgeId) -> Option<(NodeId, NodeId)> {
        let &index = self.edge_id_to_index.get(&id)?;
        let (a, b) = self.graph.edge_endpoints(index)?;
        Some((self.node_index_to_id[&a], self.node_index_to_id[&b]))
    }

    /// Get the number of edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Iterate the edges incident to a node as (handle, other endpoint, record).
    ///
    /// A self-loop appears once, with the node itself as the other endpoint.
    /// Unknown ids yield an empty iterator.
    pub fn edges_at(&self, id: NodeId) -> impl Iterator<Item = (EdgeId, NodeId, &Edge)> + '_ {
        self.node_id_to_index
            .get(&id)
            .into_iter()
            .flat_map(move |&index| {
                self.graph.edges(index).map(move |edge_ref| {
                    let other = if edge_ref.source() == index {
                        edge_ref.target()
                    } else {
                        edge_ref.source()
                    };
                    (
                        self.edge_index_to_id[&edge_ref.id()],
                        self.node_index_to_id[&other],
                        edge_ref.weight(),
                    )
                })
            })
    }

    /// Visit each undirected edge exactly once, in canonical order.
    ///
    /// An edge is emitted only while iterating from its numerically smaller
    /// endpoint, so parallel edges are each visited once and the visit order
    /// is deterministic. Self-loops are never emitted.
    pub fn for_each_edge(&self, mut callback: impl FnMut(EdgeId, NodeId, NodeId, &Edge)) {
        for id in self.node_id_to_index.keys().copied() {
            for (edge_id, other, edge) in self.edges_at(id) {
                if id < other {
                    callback(edge_id, id, other, edge);
                }
            }
        }
    }

    // =========================================================================
    // Degree Queries
    // =========================================================================

    /// Number of incident edge handles. 0 for unknown ids.
    pub fn degree(&self, id: NodeId) -> usize {
        self.node_id_to_index
            .get(&id)
            .map(|&index| self.graph.edges(index).count())
            .unwrap_or(0)
    }

    /// Sum of incident edge weights. 0 for unknown ids.
    pub fn weighted_degree(&self, id: NodeId) -> f64 {
        self.edges_at(id).map(|(_, _, edge)| edge.weight).sum()
    }

    /// Count incident edges whose other endpoint lies in `set`.
    ///
    /// Returns 0 when the node itself is a member of `set`.
    pub fn edge_count_between(&self, id: NodeId, set: &BTreeSet<NodeId>) -> usize {
        if set.contains(&id) {
            return 0;
        }
        self.edges_at(id)
            .filter(|(_, other, _)| set.contains(other))
            .count()
    }

    // =========================================================================
    // Utilities
    // =========================================================================

    /// Clear all nodes and edges, resetting the store to its initial state.
    pub fn clear(&mut self) {
        self.graph.clear();
        self.node_id_to_index.clear();
        self.node_index_to_id.clear();
        self.edge_id_to_index.clear();
        self.edge_index_to_id.clear();
        self.next_node_id = 0;
        self.next_edge_id = 0;
    }
}

impl Default for GraphStore {
    fn default() -> Self {
        Self::new()
    }
}
