//! Parser for the `.grf` persisted graph text format.
//!
//! The format is the kernel's input contract; fetching the text is the
//! host's job. Layout:
//!
//! ```text
//! # comment lines are dropped before any indexing
//! <node count n>
//! <row for node 0>
//! ...
//! <row for node n-1>
//! ```
//!
//! Each row is comma-separated with at least n+1 columns: columns [0, n)
//! are adjacency flags (consulted only above the diagonal, "1" means an
//! edge of weight 1), column n is a trimmed color name (empty means
//! uncolored), and any further columns are free-form tags where `Nailed`
//! marks the node nailed.

use log::debug;

use super::edge::Edge;
use super::node::{Node, NodeId};
use super::store::GraphStore;
use crate::error::GraphError;

/// Parse `.grf` text into a fresh graph.
///
/// Malformed input (non-numeric count, missing or short rows) is rejected
/// with `InvalidInput` rather than silently accepted as valid state.
pub fn parse_grf(text: &str) -> Result<GraphStore, GraphError> {
    let lines: Vec<&str> = text.lines().filter(|line| !line.starts_with('#')).collect();

    let count_line = lines
        .first()
        .ok_or_else(|| GraphError::InvalidInput("empty file".into()))?;
    let node_count: usize = count_line
        .trim()
        .parse()
        .map_err(|_| GraphError::InvalidInput(format!("bad node count {:?}", count_line)))?;

    let mut graph = GraphStore::with_capacity(node_count, node_count);
    for _ in 0..node_count {
        graph.add_node(Node::default());
    }

    for i in 0..node_count {
        let row = lines
            .get(i + 1)
            .ok_or_else(|| GraphError::InvalidInput(format!("missing row for node {}", i)))?;
        let columns: Vec<&str> = row.split(',').collect();
        if columns.len() < node_count + 1 {
            return Err(GraphError::InvalidInput(format!(
                "row for node {} has {} columns, expected at least {}",
                i,
                columns.len(),
                node_count + 1
            )));
        }

        // Adjacency flags above the diagonal only; the lower triangle is
        // redundant and never consulted.
        for (j, &flag) in columns.iter().enumerate().take(node_count).skip(i + 1) {
            if flag.trim() == "1" {
                graph.add_edge(NodeId(i as u32), NodeId(j as u32), Edge::default())?;
            }
        }

        let color = columns[node_count].trim();
        let nailed = columns[node_count + 1..]
            .iter()
            .any(|tag| tag.trim() == "Nailed");

        let node = graph
            .node_mut(NodeId(i as u32))
            .ok_or(GraphError::ConstraintViolation(NodeId(i as u32)))?;
        if !color.is_empty() {
            node.color = Some(color.to_string());
        }
        node.flags.set_nailed(nailed);
    }

    debug!(
        "parsed graph: {} nodes, {} edges",
        graph.node_count(),
        graph.edge_count()
    );
    Ok(graph)
}
