//! Layout algorithms.
//!
//! Two routes to the same spring equilibrium — iterative relaxation and a
//! direct solve — plus the square-tiling construction built on top of an
//! equilibrated embedding.

mod equilibrium;
mod relax;
mod tiling;

pub use equilibrium::solve_equilibrium;
pub use relax::{
    place_nailed_nodes, randomize_free_nodes, rubber_band_step, ForceMode, Relaxation, StepResult,
};
pub use tiling::{
    create_square_tiling, setup_graph_for_tiling, Square, SquareTiling, VerticalSegment,
};
