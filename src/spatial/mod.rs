//! Spatial indexing for pointer picking.

mod rtree;

pub use rtree::{NodePoint, SpatialIndex};
