//! Graph data structure module.
//!
//! Contains the core graph store, node/edge records and stable ids, and
//! the `.grf` text-format parser.

mod edge;
mod grf;
mod node;
mod store;

pub use edge::{Edge, EdgeId};
pub use grf::parse_grf;
pub use node::{Node, NodeFlags, NodeId};
pub use store::GraphStore;
