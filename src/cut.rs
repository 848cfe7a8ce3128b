//! Maximum-cut search.
//!
//! `current_cut_size` scores the bipartition induced by a color label;
//! `precise_max_cut` finds a certified optimum by branch-and-bound. The
//! search order is part of the contract: nodes are pre-sorted descending
//! by degree (ties in ascending id order) and part1 is always tried before
//! part2, so the reported partition — not just its size — is reproducible.

use std::collections::BTreeSet;

use log::debug;
use serde::Serialize;

use crate::graph::{GraphStore, NodeId};

/// A bipartition of the node set and the number of edges crossing it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cut {
    pub part1: BTreeSet<NodeId>,
    pub part2: BTreeSet<NodeId>,
    /// Number of edges with one endpoint in each part.
    pub cut_size: usize,
}

/// Count the edges whose endpoints disagree on membership in the set of
/// nodes colored `color_name`. O(E).
pub fn current_cut_size(graph: &GraphStore, color_name: &str) -> usize {
    let mut cut_size = 0;
    graph.for_each_edge(|_, from, to, _| {
        let from_in = graph
            .node(from)
            .is_some_and(|n| n.color.as_deref() == Some(color_name));
        let to_in = graph
            .node(to)
            .is_some_and(|n| n.color.as_deref() == Some(color_name));
        if from_in != to_in {
            cut_size += 1;
        }
    });
    cut_size
}

/// Exact maximum cut via branch-and-bound.
///
/// Worst-case exponential; intended for small and moderate graphs. The
/// degree-descending presort resolves high-impact decisions early, which
/// strengthens the pruning bound: at depth i with cut size S, no more than
/// `(n - i) · degree(node_i)` further edges can cross, and a branch whose
/// optimistic total cannot beat the incumbent is cut off before it forks.
pub fn precise_max_cut(graph: &GraphStore) -> Cut {
    let mut order: Vec<NodeId> = graph.node_ids().collect();
    order.sort_by_key(|&id| std::cmp::Reverse(graph.degree(id)));

    let mut best = Cut::default();
    let mut current = Cut::default();
    branch(graph, &order, 0, &mut current, &mut best);

    debug!(
        "max cut: {} edges ({} / {} nodes)",
        best.cut_size,
        best.part1.len(),
        best.part2.len()
    );
    best
}

fn branch(graph: &GraphStore, order: &[NodeId], depth: usize, current: &mut Cut, best: &mut Cut) {
    let n = order.len();
    if depth == n {
        if current.cut_size > best.cut_size {
            *best = current.clone();
        }
        return;
    }
    let id = order[depth];

    // Optimistic bound, intentionally loose: every remaining node could at
    // most contribute this node's degree in crossing edges.
    if current.cut_size + (n - depth) * graph.degree(id) <= best.cut_size {
        return;
    }

    current.part1.insert(id);
    let crossing = graph.edge_count_between(id, &current.part2);
    current.cut_size += crossing;
    branch(graph, order, depth + 1, current, best);
    current.part1.remove(&id);
    current.cut_size -= crossing;

    current.part2.insert(id);
    let crossing = graph.edge_count_between(id, &current.part1);
    current.cut_size += crossing;
    branch(graph, order, depth + 1, current, best);
    current.part2.remove(&id);
    current.cut_size -= crossing;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Edge, Node};

    fn cycle(n: usize) -> (GraphStore, Vec<NodeId>) {
        let mut graph = GraphStore::new();
        let ids: Vec<NodeId> = (0..n)
            .map(|i| graph.add_node(Node::at(i as f64, 0.0)))
            .collect();
        for i in 0..n {
            graph
                .add_edge(ids[i], ids[(i + 1) % n], Edge::default())
                .unwrap();
        }
        (graph, ids)
    }

    #[test]
    fn test_triangle_max_cut_is_two() {
        let (graph, _) = cycle(3);
        let cut = precise_max_cut(&graph);
        assert_eq!(cut.cut_size, 2);
        assert_eq!(cut.part1.len() + cut.part2.len(), 3);
        assert!(cut.part1.is_disjoint(&cut.part2));
    }

    #[test]
    fn test_four_cycle_max_cut_is_four() {
        let (graph, ids) = cycle(4);
        let cut = precise_max_cut(&graph);
        assert_eq!(cut.cut_size, 4);
        // The even cycle is bipartite: alternating corners.
        assert!(cut.part1.contains(&ids[0]) == cut.part1.contains(&ids[2]));
        assert!(cut.part2.contains(&ids[1]) == cut.part2.contains(&ids[3]));
    }

    #[test]
    fn test_empty_graph() {
        let graph = GraphStore::new();
        let cut = precise_max_cut(&graph);
        assert_eq!(cut.cut_size, 0);
        assert!(cut.part1.is_empty());
        assert!(cut.part2.is_empty());
    }

    #[test]
    fn test_complete_four_max_cut() {
        let mut graph = GraphStore::new();
        let ids: Vec<NodeId> = (0..4).map(|_| graph.add_node(Node::default())).collect();
        for i in 0..4 {
            for j in (i + 1)..4 {
                graph.add_edge(ids[i], ids[j], Edge::default()).unwrap();
            }
        }
        // K4 splits 2+2 at best: 4 crossing edges.
        assert_eq!(precise_max_cut(&graph).cut_size, 4);
    }

    #[test]
    fn test_star_puts_center_alone() {
        let mut graph = GraphStore::new();
        let center = graph.add_node(Node::default());
        let leaves: Vec<NodeId> = (0..3).map(|_| graph.add_node(Node::default())).collect();
        for &leaf in &leaves {
            graph.add_edge(center, leaf, Edge::default()).unwrap();
        }

        let cut = precise_max_cut(&graph);
        assert_eq!(cut.cut_size, 3);
        assert_eq!(cut.part1, BTreeSet::from([center]));
        assert_eq!(cut.part2, leaves.iter().copied().collect());
    }

    #[test]
    fn test_parallel_edges_count_individually() {
        let mut graph = GraphStore::new();
        let a = graph.add_node(Node::default());
        let b = graph.add_node(Node::default());
        graph.add_edge(a, b, Edge::default()).unwrap();
        graph.add_edge(a, b, Edge::default()).unwrap();

        assert_eq!(precise_max_cut(&graph).cut_size, 2);
    }

    #[test]
    fn test_reported_partition_is_deterministic() {
        // Path a-b-c: the highest-degree node b is decided first and the
        // first optimum found in part1-then-part2 order is kept.
        let mut graph = GraphStore::new();
        let a = graph.add_node(Node::default());
        let b = graph.add_node(Node::default());
        let c = graph.add_node(Node::default());
        graph.add_edge(a, b, Edge::default()).unwrap();
        graph.add_edge(b, c, Edge::default()).unwrap();

        let cut = precise_max_cut(&graph);
        assert_eq!(cut.cut_size, 2);
        assert_eq!(cut.part1, BTreeSet::from([b]));
        assert_eq!(cut.part2, BTreeSet::from([a, c]));
    }

    #[test]
    fn test_current_cut_size_by_color() {
        let mut graph = GraphStore::new();
        let a = graph.add_node(Node::default());
        let b = graph.add_node(Node::default());
        let c = graph.add_node(Node::default());
        graph.add_edge(a, b, Edge::default()).unwrap();
        graph.add_edge(b, c, Edge::default()).unwrap();
        graph.add_edge(a, c, Edge::default()).unwrap();

        graph.node_mut(a).unwrap().color = Some("White".into());
        graph.node_mut(b).unwrap().color = Some("Red".into());
        // c stays uncolored, which counts as outside the White set.

        assert_eq!(current_cut_size(&graph, "White"), 2);
        assert_eq!(current_cut_size(&graph, "Red"), 2);
        assert_eq!(current_cut_size(&graph, "Green"), 0);
    }

    #[test]
    fn test_coloring_a_max_cut_reproduces_its_size() {
        let (mut graph, _) = cycle(5);
        let cut = precise_max_cut(&graph);
        assert_eq!(cut.cut_size, 4);

        let part1 = cut.part1.clone();
        for id in graph.node_ids().collect::<Vec<_>>() {
            let color = if part1.contains(&id) { "White" } else { "Red" };
            graph.node_mut(id).unwrap().color = Some(color.into());
        }
        assert_eq!(current_cut_size(&graph, "White"), cut.cut_size);
    }
}
