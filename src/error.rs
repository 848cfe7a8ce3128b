//! Error taxonomy for the kernel.
//!
//! Three classes of failure (everything else is a documented fallback, not
//! an error):
//! - `ConstraintViolation`: a mutation would break a structural invariant
//!   (an edge referencing an unknown node id).
//! - `InvalidInput`: malformed persisted graph text.
//! - `DegenerateState`: an algorithm was invoked on a graph that cannot
//!   support it (empty graph, too few nailed nodes, singular system). The
//!   operation reports the condition and leaves the graph unchanged.

use thiserror::Error;

use crate::graph::NodeId;

/// Kernel error type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// An edge endpoint does not reference a live node.
    #[error("edge references unknown node {0}")]
    ConstraintViolation(NodeId),

    /// Malformed persisted graph text.
    #[error("invalid graph text: {0}")]
    InvalidInput(String),

    /// The graph cannot support the requested operation in its current state.
    #[error("degenerate state: {0}")]
    DegenerateState(&'static str),
}
