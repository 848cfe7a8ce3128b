//! GraphTutor - WASM kernel
//!
//! The computational kernel of the GraphTutor interactive graph-theory
//! teaching tool. It is compiled to WebAssembly and exposes a
//! JavaScript-friendly API via wasm-bindgen; the JS host owns rendering,
//! pointer handling and step scheduling.
//!
//! # Architecture
//!
//! - `graph`: graph store (petgraph StableGraph), node/edge records, `.grf` parsing
//! - `layout`: spring relaxation, direct equilibrium solve, square tiling
//! - `cut`: exact maximum-cut search and colored-cut counting
//! - `spatial`: R-tree index for pointer picking
//! - `error`: the kernel error taxonomy

use js_sys::Float32Array;
use wasm_bindgen::prelude::*;

pub mod cut;
pub mod error;
pub mod graph;
pub mod layout;
pub mod spatial;

use graph::{Edge, EdgeId, GraphStore, Node, NodeId};
use layout::ForceMode;
use spatial::SpatialIndex;

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Main entry point for the kernel.
///
/// This struct wraps the internal GraphStore and provides the public API
/// exposed to JavaScript.
#[wasm_bindgen]
pub struct GraphTutorWasm {
    store: GraphStore,
    spatial: SpatialIndex,
}

#[wasm_bindgen]
impl GraphTutorWasm {
    /// Create a new empty kernel.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            store: GraphStore::new(),
            spatial: SpatialIndex::new(),
        }
    }

    /// Replace the graph with one parsed from `.grf` text.
    #[wasm_bindgen(js_name = loadGrf)]
    pub fn load_grf(&mut self, text: &str) -> Result<(), JsError> {
        self.store = graph::parse_grf(text)?;
        self.spatial.clear();
        Ok(())
    }

    // =========================================================================
    // Node Operations
    // =========================================================================

    /// Add a free node at the specified position.
    ///
    /// Returns the stable node ID.
    #[wasm_bindgen(js_name = addNode)]
    pub fn add_node(&mut self, x: f64, y: f64) -> u32 {
        self.store.add_node(Node::at(x, y)).0
    }

    /// Remove a node and all its incident edges.
    ///
    /// Returns true if the node existed and was removed.
    #[wasm_bindgen(js_name = deleteNode)]
    pub fn delete_node(&mut self, node_id: u32) -> bool {
        self.store.delete_node(NodeId(node_id))
    }

    /// Get the number of nodes in the graph.
    #[wasm_bindgen(js_name = nodeCount)]
    pub fn node_count(&self) -> u32 {
        self.store.node_count() as u32
    }

    /// Get all node ids in ascending order.
    #[wasm_bindgen(js_name = getNodeIds)]
    pub fn get_node_ids(&self) -> Vec<u32> {
        self.store.node_ids().map(|id| id.0).collect()
    }

    /// Get a node's X position.
    #[wasm_bindgen(js_name = getNodeX)]
    pub fn get_node_x(&self, node_id: u32) -> Option<f64> {
        self.store.node(NodeId(node_id)).map(|node| node.x)
    }

    /// Get a node's Y position.
    #[wasm_bindgen(js_name = getNodeY)]
    pub fn get_node_y(&self, node_id: u32) -> Option<f64> {
        self.store.node(NodeId(node_id)).map(|node| node.y)
    }

    /// Set a node's position.
    #[wasm_bindgen(js_name = setNodePosition)]
    pub fn set_node_position(&mut self, node_id: u32, x: f64, y: f64) {
        if let Some(node) = self.store.node_mut(NodeId(node_id)) {
            node.x = x;
            node.y = y;
        }
    }

    /// Nail a node (fix its position permanently).
    #[wasm_bindgen(js_name = nailNode)]
    pub fn nail_node(&mut self, node_id: u32) {
        if let Some(node) = self.store.node_mut(NodeId(node_id)) {
            node.flags.set_nailed(true);
        }
    }

    /// Un-nail a node.
    #[wasm_bindgen(js_name = unnailNode)]
    pub fn unnail_node(&mut self, node_id: u32) {
        if let Some(node) = self.store.node_mut(NodeId(node_id)) {
            node.flags.set_nailed(false);
        }
    }

    /// Check if a node is nailed.
    #[wasm_bindgen(js_name = isNodeNailed)]
    pub fn is_node_nailed(&self, node_id: u32) -> bool {
        self.store
            .node(NodeId(node_id))
            .map(|node| node.is_nailed())
            .unwrap_or(false)
    }

    /// Fix or free a node's x axis.
    #[wasm_bindgen(js_name = setNodeFixedX)]
    pub fn set_node_fixed_x(&mut self, node_id: u32, fixed: bool) {
        if let Some(node) = self.store.node_mut(NodeId(node_id)) {
            node.flags.set_fixed_x(fixed);
        }
    }

    /// Fix or free a node's y axis.
    #[wasm_bindgen(js_name = setNodeFixedY)]
    pub fn set_node_fixed_y(&mut self, node_id: u32, fixed: bool) {
        if let Some(node) = self.store.node_mut(NodeId(node_id)) {
            node.flags.set_fixed_y(fixed);
        }
    }

    /// Set or clear a node's color label.
    #[wasm_bindgen(js_name = setNodeColor)]
    pub fn set_node_color(&mut self, node_id: u32, color: Option<String>) {
        if let Some(node) = self.store.node_mut(NodeId(node_id)) {
            node.color = color;
        }
    }

    /// Get a node's color label.
    #[wasm_bindgen(js_name = getNodeColor)]
    pub fn get_node_color(&self, node_id: u32) -> Option<String> {
        self.store
            .node(NodeId(node_id))
            .and_then(|node| node.color.clone())
    }

    /// Get all positions interleaved as [x0, y0, x1, y1, ...] in the order
    /// of `getNodeIds`.
    #[wasm_bindgen(js_name = getPositions)]
    pub fn get_positions(&self) -> Float32Array {
        let mut positions = Vec::with_capacity(self.store.node_count() * 2);
        for (_, node) in self.store.nodes() {
            positions.push(node.x as f32);
            positions.push(node.y as f32);
        }
        Float32Array::from(&positions[..])
    }

    // =========================================================================
    // Edge Operations
    // =========================================================================

    /// Add an edge between two nodes.
    ///
    /// Fails if either endpoint does not exist.
    #[wasm_bindgen(js_name = addEdge)]
    pub fn add_edge(&mut self, from: u32, to: u32, weight: f64) -> Result<u32, JsError> {
        let id = self
            .store
            .add_edge(NodeId(from), NodeId(to), Edge::with_weight(weight))?;
        Ok(id.0)
    }

    /// Remove an edge by ID.
    ///
    /// Returns true if the edge existed and was removed.
    #[wasm_bindgen(js_name = deleteEdge)]
    pub fn delete_edge(&mut self, edge_id: u32) -> bool {
        self.store.delete_edge(EdgeId(edge_id))
    }

    /// Get the number of edges in the graph.
    #[wasm_bindgen(js_name = edgeCount)]
    pub fn edge_count(&self) -> u32 {
        self.store.edge_count() as u32
    }

    /// Get the edge list as flat [id, from, to, ...] triples in canonical
    /// order (each undirected edge exactly once).
    #[wasm_bindgen(js_name = getEdgeList)]
    pub fn get_edge_list(&self) -> Vec<u32> {
        let mut list = Vec::with_capacity(self.store.edge_count() * 3);
        self.store.for_each_edge(|edge_id, from, to, _| {
            list.push(edge_id.0);
            list.push(from.0);
            list.push(to.0);
        });
        list
    }

    /// Get an edge's weight.
    #[wasm_bindgen(js_name = getEdgeWeight)]
    pub fn get_edge_weight(&self, edge_id: u32) -> Option<f64> {
        self.store.edge(EdgeId(edge_id)).map(|edge| edge.weight)
    }

    /// Get a node's degree.
    pub fn degree(&self, node_id: u32) -> u32 {
        self.store.degree(NodeId(node_id)) as u32
    }

    /// Get a node's weighted degree (sum of incident weights).
    #[wasm_bindgen(js_name = weightedDegree)]
    pub fn weighted_degree(&self, node_id: u32) -> f64 {
        self.store.weighted_degree(NodeId(node_id))
    }

    // =========================================================================
    // Layout
    // =========================================================================

    /// Place the nailed nodes on the unit-circle boundary.
    #[wasm_bindgen(js_name = placeNailedNodes)]
    pub fn place_nailed_nodes(&mut self) {
        layout::place_nailed_nodes(&mut self.store);
    }

    /// Scatter free nodes uniformly over [-1, 1] per non-fixed axis.
    #[wasm_bindgen(js_name = randomizeFreeNodes)]
    pub fn randomize_free_nodes(&mut self) {
        layout::randomize_free_nodes(&mut self.store, &mut rand::thread_rng());
    }

    /// Run one spring-relaxation step.
    ///
    /// Returns `{ maxChange, maxCoord }`; the host keeps stepping while
    /// maxChange is above its threshold and maxCoord below its divergence
    /// bound.
    #[wasm_bindgen(js_name = rubberBandStep)]
    pub fn rubber_band_step(&mut self, rate: f64, mode: &str) -> Result<JsValue, JsError> {
        let result =
            layout::rubber_band_step(&mut self.store, rate, ForceMode::from_name(mode));
        Ok(serde_wasm_bindgen::to_value(&result)?)
    }

    /// Solve the spring equilibrium directly.
    ///
    /// `extra_fixed` additionally pins one node (the one being dragged).
    #[wasm_bindgen(js_name = solveEquilibrium)]
    pub fn solve_equilibrium(&mut self, extra_fixed: Option<u32>) -> Result<(), JsError> {
        layout::solve_equilibrium(&mut self.store, extra_fixed.map(NodeId))?;
        Ok(())
    }

    /// Prepare the nailed boundary for a tiling run.
    #[wasm_bindgen(js_name = setupTiling)]
    pub fn setup_tiling(&mut self) -> Result<(), JsError> {
        layout::setup_graph_for_tiling(&mut self.store)?;
        Ok(())
    }

    /// Build the square tiling from the current embedding and apply the
    /// proposed node positions (the host treats this as a relayout).
    #[wasm_bindgen(js_name = createSquareTiling)]
    pub fn create_square_tiling(&mut self) -> Result<JsValue, JsError> {
        let tiling = layout::create_square_tiling(&self.store, &mut rand::thread_rng())?;
        tiling.apply_positions(&mut self.store);
        Ok(serde_wasm_bindgen::to_value(&tiling)?)
    }

    // =========================================================================
    // Cuts
    // =========================================================================

    /// Count the edges cut by the bipartition {colored `colorName`, rest}.
    #[wasm_bindgen(js_name = currentCutSize)]
    pub fn current_cut_size(&self, color_name: &str) -> u32 {
        cut::current_cut_size(&self.store, color_name) as u32
    }

    /// Find a certified maximum cut.
    ///
    /// Exact branch-and-bound; worst-case exponential, intended for the
    /// small graphs of the teaching material.
    #[wasm_bindgen(js_name = preciseMaxCut)]
    pub fn precise_max_cut(&self) -> Result<JsValue, JsError> {
        let cut = cut::precise_max_cut(&self.store);
        Ok(serde_wasm_bindgen::to_value(&cut)?)
    }

    // =========================================================================
    // Spatial Queries
    // =========================================================================

    /// Rebuild the spatial index from current node positions.
    ///
    /// Call after bulk position changes for accurate picking.
    #[wasm_bindgen(js_name = rebuildSpatialIndex)]
    pub fn rebuild_spatial_index(&mut self) {
        let points: Vec<_> = self
            .store
            .nodes()
            .map(|(id, node)| (id, node.x, node.y))
            .collect();
        self.spatial.rebuild(&points);
    }

    /// Find the nearest node to a point.
    #[wasm_bindgen(js_name = findNearestNode)]
    pub fn find_nearest_node(&self, x: f64, y: f64) -> Option<u32> {
        self.spatial.nearest(x, y).map(|id| id.0)
    }

    /// Find the nearest node within a maximum distance.
    #[wasm_bindgen(js_name = findNearestNodeWithin)]
    pub fn find_nearest_node_within(&self, x: f64, y: f64, max_distance: f64) -> Option<u32> {
        self.spatial.nearest_within(x, y, max_distance).map(|id| id.0)
    }

    // =========================================================================
    // Utilities
    // =========================================================================

    /// Clear all nodes and edges.
    pub fn clear(&mut self) {
        self.store.clear();
        self.spatial.clear();
    }
}

impl Default for GraphTutorWasm {
    fn default() -> Self {
        Self::new()
    }
}
