//! Initial placement and iterative spring relaxation.
//!
//! Edges act as springs pulling each free node toward the weighted centroid
//! of its neighbors; nailed nodes form the Dirichlet boundary (the convex
//! boundary of a Tutte-style spring embedding). One step is synchronous and
//! Jacobi-style: every node is updated from the same whole-graph snapshot,
//! so the step is independent of iteration order.

use std::f64::consts::PI;

use rand::Rng;
use serde::Serialize;

use crate::graph::{GraphStore, NodeId};

/// How one relaxation step applies the spring force.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ForceMode {
    /// Gradient descent toward the spring equilibrium.
    Attract,
    /// Invert the force, pushing neighbors apart.
    #[default]
    Repel,
    /// Repel, with the result radially projected back into the unit disc.
    RepelConstrained,
}

impl ForceMode {
    /// Parse a host-supplied mode name. Anything unrecognized repels,
    /// matching the attract-or-not dichotomy of the step itself.
    pub fn from_name(name: &str) -> Self {
        match name {
            "attract" => Self::Attract,
            "repel-constrained" => Self::RepelConstrained,
            _ => Self::Repel,
        }
    }
}

/// Outcome of one relaxation step.
#[derive(Debug, Clone, Copy, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepResult {
    /// Largest per-axis displacement any node made this step.
    pub max_change: f64,
    /// Largest absolute coordinate any updated node reached.
    pub max_coord: f64,
}

/// Place the nailed nodes on the layout boundary.
///
/// Counts 0, 1 and 2 are special-cased (no-op; top of the unit circle; the
/// horizontal diameter). Three or more go around the unit circle at angle
/// i·2π/n in their id order, which for a loaded graph is file order.
pub fn place_nailed_nodes(graph: &mut GraphStore) {
    let nailed: Vec<NodeId> = graph
        .nodes()
        .filter(|(_, node)| node.is_nailed())
        .map(|(id, _)| id)
        .collect();

    let coords: Vec<(f64, f64)> = match nailed.len() {
        0 => return,
        1 => vec![(0.0, 1.0)],
        2 => vec![(-1.0, 0.0), (1.0, 0.0)],
        n => {
            let alpha = 2.0 * PI / n as f64;
            (0..n)
                .map(|i| {
                    let angle = i as f64 * alpha;
                    (angle.sin(), angle.cos())
                })
                .collect()
        }
    };

    for (&id, &(x, y)) in nailed.iter().zip(coords.iter()) {
        if let Some(node) = graph.node_mut(id) {
            node.x = x;
            node.y = y;
        }
    }
}

/// Scatter every non-nailed node uniformly over [-1, 1] on each axis that
/// is not marked fixed.
pub fn randomize_free_nodes<R: Rng>(graph: &mut GraphStore, rng: &mut R) {
    let ids: Vec<NodeId> = graph.node_ids().collect();
    for id in ids {
        let Some(node) = graph.node_mut(id) else {
            continue;
        };
        if node.is_nailed() {
            continue;
        }
        if !node.is_fixed_x() {
            node.x = rng.gen_range(-1.0..1.0);
        }
        if !node.is_fixed_y() {
            node.y = rng.gen_range(-1.0..1.0);
        }
    }
}

/// Run one synchronous relaxation step.
///
/// Every node's position is snapshotted first; forces are then computed
/// from the snapshot only, so all nodes move simultaneously. A node moves
/// only if it is neither nailed nor isolated; a fixed axis zeroes its
/// delta; `RepelConstrained` clamps the result to the unit disc.
pub fn rubber_band_step(graph: &mut GraphStore, rate: f64, mode: ForceMode) -> StepResult {
    let ids: Vec<NodeId> = graph.node_ids().collect();

    for &id in &ids {
        if let Some(node) = graph.node_mut(id) {
            node.prev_x = node.x;
            node.prev_y = node.y;
        }
    }

    let mut result = StepResult::default();
    for &id in &ids {
        let Some(node) = graph.node(id) else {
            continue;
        };
        if node.is_nailed() || graph.degree(id) == 0 {
            continue;
        }
        let (px, py) = (node.prev_x, node.prev_y);
        let (fixed_x, fixed_y) = (node.is_fixed_x(), node.is_fixed_y());

        // Discrete weighted-Laplacian force: the Dirichlet-energy gradient.
        let mut force_x = 0.0;
        let mut force_y = 0.0;
        for (_, other_id, edge) in graph.edges_at(id) {
            let Some(other) = graph.node(other_id) else {
                continue;
            };
            force_x += (other.prev_x - px) * edge.weight;
            force_y += (other.prev_y - py) * edge.weight;
        }

        let mut dx = rate * force_x;
        let mut dy = rate * force_y;
        if fixed_x {
            dx = 0.0;
        }
        if fixed_y {
            dy = 0.0;
        }

        let (mut x, mut y) = match mode {
            ForceMode::Attract => (px + dx, py + dy),
            _ => (px - dx, py - dy),
        };
        if mode == ForceMode::RepelConstrained {
            let r = (x * x + y * y).sqrt();
            if r > 1.0 {
                x /= r;
                y /= r;
            }
        }

        if let Some(node) = graph.node_mut(id) {
            node.x = x;
            node.y = y;
        }
        result.max_change = result.max_change.max((x - px).abs()).max((y - py).abs());
        result.max_coord = result.max_coord.max(x.abs()).max(y.abs());
    }
    result
}

/// Loop driver for the relaxation.
///
/// The kernel never schedules itself: the caller (UI timer, test harness,
/// batch driver) invokes `step` and consults `should_continue`, which
/// encodes the convergence contract — keep stepping while the largest
/// displacement exceeds `threshold` and no coordinate has run past
/// `divergence_bound`.
#[derive(Debug, Clone)]
pub struct Relaxation {
    /// Step size applied to the spring force.
    pub rate: f64,
    /// Force mode applied on every step.
    pub mode: ForceMode,
    /// Displacement below which the layout counts as settled.
    pub threshold: f64,
    /// Coordinate magnitude past which the layout counts as diverged.
    pub divergence_bound: f64,
    last: Option<StepResult>,
}

impl Default for Relaxation {
    fn default() -> Self {
        Self {
            rate: 0.04,
            mode: ForceMode::Attract,
            threshold: 1e-5,
            divergence_bound: 10_000.0,
            last: None,
        }
    }
}

impl Relaxation {
    /// Create a driver with the given rate and mode and default bounds.
    pub fn new(rate: f64, mode: ForceMode) -> Self {
        Self {
            rate,
            mode,
            ..Self::default()
        }
    }

    /// Run one step and record its outcome.
    pub fn step(&mut self, graph: &mut GraphStore) -> StepResult {
        let result = rubber_band_step(graph, self.rate, self.mode);
        self.last = Some(result);
        result
    }

    /// The most recent step outcome, if any step has run.
    pub fn last_step(&self) -> Option<StepResult> {
        self.last
    }

    /// True once a step has moved nothing further than the threshold.
    pub fn is_settled(&self) -> bool {
        self.last
            .is_some_and(|r| r.max_change <= self.threshold)
    }

    /// True once any coordinate has passed the divergence bound.
    pub fn is_diverged(&self) -> bool {
        self.last
            .is_some_and(|r| r.max_coord >= self.divergence_bound)
    }

    /// The caller's loop condition: not yet settled, not yet diverged.
    pub fn should_continue(&self) -> bool {
        match self.last {
            None => true,
            Some(r) => r.max_change > self.threshold && r.max_coord < self.divergence_bound,
        }
    }

    /// Forget previous outcomes, e.g. after the graph was edited.
    pub fn reset(&mut self) {
        self.last = None;
    }
}
