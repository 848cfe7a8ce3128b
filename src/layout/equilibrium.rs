//! Direct weighted-Laplacian equilibrium solve.
//!
//! Solves the fixed point the iterative relaxation converges to: every free
//! node sits at the weighted centroid of its neighbors, with nailed nodes
//! (plus an optional extra node, typically the one under the pointer during
//! a drag) pinned as Dirichlet boundary data. One dense system per axis;
//! teaching-scale graphs keep n small, so Gaussian elimination with partial
//! pivoting is all the solver there is to it.

use std::collections::HashMap;

use crate::error::GraphError;
use crate::graph::{GraphStore, NodeId};

/// Pivot magnitudes below this count as singular.
const PIVOT_EPSILON: f64 = 1e-12;

/// Move every free node to its weighted-Laplacian equilibrium position.
///
/// Rows for nailed nodes, `extra_fixed`, and isolated nodes pin their
/// current coordinates; every other row encodes
/// `weighted_degree(i)·x_i − Σ_{j~i} w(i,j)·x_j = 0`. Isolated nodes keep
/// their position (a zero-degree row is meaningless, not an error). An
/// empty graph, or a free component unreachable from any pinned node
/// (singular system), raises `DegenerateState` with every position left
/// untouched.
pub fn solve_equilibrium(
    graph: &mut GraphStore,
    extra_fixed: Option<NodeId>,
) -> Result<(), GraphError> {
    let n = graph.node_count();
    if n == 0 {
        return Err(GraphError::DegenerateState("empty graph"));
    }

    let ids: Vec<NodeId> = graph.node_ids().collect();
    let index_of: HashMap<NodeId, usize> = ids
        .iter()
        .enumerate()
        .map(|(index, &id)| (id, index))
        .collect();

    let mut matrix = vec![0.0f64; n * n];
    let mut rhs_x = vec![0.0f64; n];
    let mut rhs_y = vec![0.0f64; n];

    for (row, &id) in ids.iter().enumerate() {
        let Some(node) = graph.node(id) else {
            continue;
        };
        let pinned = node.is_nailed() || extra_fixed == Some(id) || graph.degree(id) == 0;
        if pinned {
            matrix[row * n + row] = 1.0;
            rhs_x[row] = node.x;
            rhs_y[row] = node.y;
        } else {
            for (_, other, edge) in graph.edges_at(id) {
                if other != id {
                    let col = index_of[&other];
                    matrix[row * n + col] -= edge.weight;
                }
            }
            matrix[row * n + row] = graph.weighted_degree(id);
        }
    }

    let solved_x = gaussian_solve(matrix.clone(), rhs_x, n)
        .ok_or(GraphError::DegenerateState(
            "singular system: a free component has no nailed node",
        ))?;
    let solved_y = gaussian_solve(matrix, rhs_y, n)
        .ok_or(GraphError::DegenerateState(
            "singular system: a free component has no nailed node",
        ))?;

    for (index, &id) in ids.iter().enumerate() {
        // Isolated nodes stay where they are.
        if graph.degree(id) == 0 {
            continue;
        }
        if let Some(node) = graph.node_mut(id) {
            node.x = solved_x[index];
            node.y = solved_y[index];
        }
    }
    Ok(())
}

/// Solve `a · x = b` by Gaussian elimination with partial pivoting.
///
/// `a` is a dense row-major n×n matrix. Returns None when a pivot vanishes
/// (singular system).
fn gaussian_solve(mut a: Vec<f64>, mut b: Vec<f64>, n: usize) -> Option<Vec<f64>> {
    for col in 0..n {
        let mut pivot_row = col;
        let mut pivot_abs = a[col * n + col].abs();
        for row in (col + 1)..n {
            let candidate = a[row * n + col].abs();
            if candidate > pivot_abs {
                pivot_abs = candidate;
                pivot_row = row;
            }
        }
        if pivot_abs < PIVOT_EPSILON {
            return None;
        }
        if pivot_row != col {
            for k in col..n {
                a.swap(col * n + k, pivot_row * n + k);
            }
            b.swap(col, pivot_row);
        }

        let pivot = a[col * n + col];
        for row in (col + 1)..n {
            let factor = a[row * n + col] / pivot;
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                a[row * n + k] -= factor * a[col * n + k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0f64; n];
    for row in (0..n).rev() {
        let mut sum = b[row];
        for k in (row + 1)..n {
            sum -= a[row * n + k] * x[k];
        }
        x[row] = sum / a[row * n + row];
    }
    Some(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Edge, Node};

    #[test]
    fn test_gaussian_solve_small_system() {
        // 2x + y = 5, x + 3y = 10  =>  x = 1, y = 3
        let a = vec![2.0, 1.0, 1.0, 3.0];
        let b = vec![5.0, 10.0];
        let x = gaussian_solve(a, b, 2).unwrap();
        assert!((x[0] - 1.0).abs() < 1e-12);
        assert!((x[1] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_gaussian_solve_needs_pivoting() {
        // Zero in the top-left corner forces a row swap.
        let a = vec![0.0, 1.0, 1.0, 0.0];
        let b = vec![2.0, 3.0];
        let x = gaussian_solve(a, b, 2).unwrap();
        assert!((x[0] - 3.0).abs() < 1e-12);
        assert!((x[1] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_gaussian_solve_singular() {
        let a = vec![1.0, 1.0, 2.0, 2.0];
        let b = vec![1.0, 2.0];
        assert!(gaussian_solve(a, b, 2).is_none());
    }

    #[test]
    fn test_free_node_at_weighted_centroid() {
        let mut graph = GraphStore::new();
        let left = graph.add_node(Node::nailed_at(0.0, 0.0));
        let middle = graph.add_node(Node::at(0.3, 0.7));
        let right = graph.add_node(Node::nailed_at(2.0, 2.0));
        graph.add_edge(left, middle, Edge::with_weight(1.0)).unwrap();
        graph.add_edge(middle, right, Edge::with_weight(3.0)).unwrap();

        solve_equilibrium(&mut graph, None).unwrap();

        // (1*0 + 3*2) / 4 on both axes.
        let node = graph.node(middle).unwrap();
        assert!((node.x - 1.5).abs() < 1e-9);
        assert!((node.y - 1.5).abs() < 1e-9);

        // The boundary is untouched.
        assert_eq!(graph.node(left).map(|n| (n.x, n.y)), Some((0.0, 0.0)));
        assert_eq!(graph.node(right).map(|n| (n.x, n.y)), Some((2.0, 2.0)));
    }

    #[test]
    fn test_path_interpolates_boundary() {
        let mut graph = GraphStore::new();
        let a = graph.add_node(Node::nailed_at(-1.0, 0.0));
        let b = graph.add_node(Node::at(0.9, 0.9));
        let c = graph.add_node(Node::at(-0.9, 0.2));
        let d = graph.add_node(Node::nailed_at(1.0, 0.0));
        graph.add_edge(a, b, Edge::default()).unwrap();
        graph.add_edge(b, c, Edge::default()).unwrap();
        graph.add_edge(c, d, Edge::default()).unwrap();

        solve_equilibrium(&mut graph, None).unwrap();

        // Equal weights space the interior nodes evenly along the segment.
        let nb = graph.node(b).unwrap();
        let nc = graph.node(c).unwrap();
        assert!((nb.x - (-1.0 / 3.0)).abs() < 1e-9);
        assert!((nc.x - 1.0 / 3.0).abs() < 1e-9);
        assert!(nb.y.abs() < 1e-9);
        assert!(nc.y.abs() < 1e-9);
    }

    #[test]
    fn test_extra_fixed_node_is_pinned() {
        let mut graph = GraphStore::new();
        let anchor = graph.add_node(Node::nailed_at(0.0, 0.0));
        let dragged = graph.add_node(Node::at(4.0, 4.0));
        let free = graph.add_node(Node::at(0.0, 0.0));
        graph.add_edge(anchor, free, Edge::default()).unwrap();
        graph.add_edge(free, dragged, Edge::default()).unwrap();

        solve_equilibrium(&mut graph, Some(dragged)).unwrap();

        // The dragged node holds its position, the free node re-equilibrates
        // between the two pins.
        assert_eq!(graph.node(dragged).map(|n| (n.x, n.y)), Some((4.0, 4.0)));
        let node = graph.node(free).unwrap();
        assert!((node.x - 2.0).abs() < 1e-9);
        assert!((node.y - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_isolated_node_keeps_position() {
        let mut graph = GraphStore::new();
        let anchor = graph.add_node(Node::nailed_at(0.0, 0.0));
        let free = graph.add_node(Node::at(1.0, 1.0));
        let lone = graph.add_node(Node::at(0.5, -0.5));
        graph.add_edge(anchor, free, Edge::default()).unwrap();

        solve_equilibrium(&mut graph, None).unwrap();

        assert_eq!(graph.node(lone).map(|n| (n.x, n.y)), Some((0.5, -0.5)));
        // The connected free node collapses onto its only neighbor.
        let node = graph.node(free).unwrap();
        assert!(node.x.abs() < 1e-9);
        assert!(node.y.abs() < 1e-9);
    }

    #[test]
    fn test_empty_graph_degenerate() {
        let mut graph = GraphStore::new();
        assert!(matches!(
            solve_equilibrium(&mut graph, None),
            Err(GraphError::DegenerateState(_))
        ));
    }

    #[test]
    fn test_unanchored_component_degenerate() {
        let mut graph = GraphStore::new();
        let anchor = graph.add_node(Node::nailed_at(0.0, 0.0));
        let free = graph.add_node(Node::at(1.0, 0.0));
        graph.add_edge(anchor, free, Edge::default()).unwrap();
        // A second component with no nailed node makes the system singular.
        let u = graph.add_node(Node::at(0.2, 0.2));
        let v = graph.add_node(Node::at(0.4, 0.4));
        graph.add_edge(u, v, Edge::default()).unwrap();

        let err = solve_equilibrium(&mut graph, None).unwrap_err();
        assert!(matches!(err, GraphError::DegenerateState(_)));

        // Nothing moved.
        assert_eq!(graph.node(free).map(|n| (n.x, n.y)), Some((1.0, 0.0)));
        assert_eq!(graph.node(u).map(|n| (n.x, n.y)), Some((0.2, 0.2)));
    }
}
