//! Non-fatal findings from topology reconstruction.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Mesh defects found while building topology.
///
/// None of these stop the build. Callers decide whether they matter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TopologyDiagnostics {
    /// Edges with a single neighbouring triangle.
    pub open_edges: Vec<u32>,
    /// Edges with more than two neighbouring triangles.
    pub overloaded_edges: Vec<u32>,
    /// Triangles that repeat a node.
    pub degenerate_tris: Vec<u32>,
}

impl TopologyDiagnostics {
    /// Number of open edges.
    #[must_use]
    pub fn open_edge_count(&self) -> usize {
        self.open_edges.len()
    }

    /// Number of edges shared by more than two triangles.
    #[must_use]
    pub fn overloaded_edge_count(&self) -> usize {
        self.overloaded_edges.len()
    }

    /// Every edge has exactly two neighbours and no triangle is degenerate.
    #[must_use]
    pub fn is_closed_manifold(&self) -> bool {
        self.open_edges.is_empty()
            && self.overloaded_edges.is_empty()
            && self.degenerate_tris.is_empty()
    }

    /// No overloaded edges or degenerate triangles. Open edges are allowed,
    /// since zero-thickness lifting surfaces always have them.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.overloaded_edges.is_empty() && self.degenerate_tris.is_empty()
    }
}

impl std::fmt::Display for TopologyDiagnostics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} open edges, {} overloaded edges, {} degenerate triangles",
            self.open_edges.len(),
            self.overloaded_edges.len(),
            self.degenerate_tris.len()
        )
    }
}
