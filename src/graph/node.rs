//! Node type and related structures.
//!
//! Nodes are the vertices in the graph. Each node has:
//! - A stable unique identifier (survives graph mutations)
//! - Position (x, y) and the previous-position snapshot used by one
//!   relaxation step
//! - A boundary-condition state: nailed (both axes fixed) or per-axis fixed
//! - Optional color label and render-size hint (opaque to the kernel)

use std::fmt;

use serde::Serialize;

/// Stable node identifier.
///
/// This ID remains valid even after other nodes are removed from the graph.
/// It wraps a u32 for efficient storage and WebAssembly interop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Create a new NodeId from a raw u32.
    #[inline]
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw u32 value.
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", self.0)
    }
}

impl From<u32> for NodeId {
    #[inline]
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<NodeId> for u32 {
    #[inline]
    fn from(id: NodeId) -> Self {
        id.0
    }
}

/// Boundary-condition flags packed into a single byte.
///
/// `NAILED` fixes both axes permanently; `FIXED_X`/`FIXED_Y` fix a single
/// axis (used by the tiling setup to seed Dirichlet data).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodeFlags {
    flags: u8,
}

impl NodeFlags {
    const NAILED: u8 = 0b0000_0001;
    const FIXED_X: u8 = 0b0000_0010;
    const FIXED_Y: u8 = 0b0000_0100;

    /// Create a new default flag set.
    #[inline]
    pub fn new() -> Self {
        Self { flags: 0 }
    }

    /// Check if the node is nailed (position permanently fixed).
    #[inline]
    pub fn is_nailed(self) -> bool {
        self.flags & Self::NAILED != 0
    }

    /// Set the nailed state.
    #[inline]
    pub fn set_nailed(&mut self, nailed: bool) {
        if nailed {
            self.flags |= Self::NAILED;
        } else {
            self.flags &= !Self::NAILED;
        }
    }

    /// Check if the x axis is fixed.
    #[inline]
    pub fn is_fixed_x(self) -> bool {
        self.flags & Self::FIXED_X != 0
    }

    /// Set the fixed-x state.
    #[inline]
    pub fn set_fixed_x(&mut self, fixed: bool) {
        if fixed {
            self.flags |= Self::FIXED_X;
        } else {
            self.flags &= !Self::FIXED_X;
        }
    }

    /// Check if the y axis is fixed.
    #[inline]
    pub fn is_fixed_y(self) -> bool {
        self.flags & Self::FIXED_Y != 0
    }

    /// Set the fixed-y state.
    #[inline]
    pub fn set_fixed_y(&mut self, fixed: bool) {
        if fixed {
            self.flags |= Self::FIXED_Y;
        } else {
            self.flags &= !Self::FIXED_Y;
        }
    }
}

/// A graph vertex.
///
/// The `prev_x`/`prev_y` snapshot belongs to the relaxation step: every node
/// is snapshotted before any node moves, so one step reads a consistent
/// state regardless of iteration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Node {
    /// Current x position.
    pub x: f64,
    /// Current y position.
    pub y: f64,
    /// Position snapshot taken at the start of a relaxation step.
    pub prev_x: f64,
    /// Position snapshot taken at the start of a relaxation step.
    pub prev_y: f64,
    /// Optional color label from the host's palette.
    pub color: Option<String>,
    /// Optional render-size hint. The kernel never reads it.
    pub size: Option<f64>,
    /// Boundary-condition flags.
    pub flags: NodeFlags,
}

impl Node {
    /// Create a free node at the given position.
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            ..Self::default()
        }
    }

    /// Create a nailed node at the given position.
    pub fn nailed_at(x: f64, y: f64) -> Self {
        let mut node = Self::at(x, y);
        node.flags.set_nailed(true);
        node
    }

    /// Check if the node is nailed.
    #[inline]
    pub fn is_nailed(&self) -> bool {
        self.flags.is_nailed()
    }

    /// Check if the x axis is fixed.
    #[inline]
    pub fn is_fixed_x(&self) -> bool {
        self.flags.is_fixed_x()
    }

    /// Check if the y axis is fixed.
    #[inline]
    pub fn is_fixed_y(&self) -> bool {
        self.flags.is_fixed_y()
    }
}
