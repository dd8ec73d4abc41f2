//! Indexed triangle record.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A triangle of an aerodynamic surface mesh.
///
/// Nodes are 0-based indices into the owning [`TriMesh`](crate::TriMesh).
/// `surface_type` and `surface_id` carry the solver's component tagging
/// through unchanged; `area` is the value stored by the solver, which may
/// differ slightly from the area recomputed from `f32` coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Tri {
    /// Node indices, in winding order.
    pub nodes: [u32; 3],
    /// Solver surface kind (wing, body, parametric surface).
    pub surface_type: i32,
    /// Component id within its surface kind.
    pub surface_id: i32,
    /// Triangle area.
    pub area: f64,
}

impl Tri {
    /// Create an untagged triangle with zero stored area.
    #[inline]
    #[must_use]
    pub const fn new(nodes: [u32; 3]) -> Self {
        Self {
            nodes,
            surface_type: 0,
            surface_id: 0,
            area: 0.0,
        }
    }

    /// Set the surface tags.
    #[inline]
    #[must_use]
    pub const fn with_surface(mut self, surface_type: i32, surface_id: i32) -> Self {
        self.surface_type = surface_type;
        self.surface_id = surface_id;
        self
    }

    /// Set the stored area.
    #[inline]
    #[must_use]
    pub const fn with_area(mut self, area: f64) -> Self {
        self.area = area;
        self
    }

    /// The same triangle with reversed winding (n3, n2, n1).
    #[inline]
    #[must_use]
    pub const fn reversed(mut self) -> Self {
        self.nodes = [self.nodes[2], self.nodes[1], self.nodes[0]];
        self
    }

    /// True when two of the three node references coincide.
    #[inline]
    #[must_use]
    pub const fn is_degenerate(&self) -> bool {
        let [a, b, c] = self.nodes;
        a == b || b == c || a == c
    }
}
