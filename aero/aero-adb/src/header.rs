//! Database header: model kind, flags, counts and reference quantities.

use aero_types::Point3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::format::{FileVersion, ModelType};

/// Reference quantities used to non-dimensionalize forces.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ReferenceQuantities {
    /// Reference area.
    pub sref: f64,
    /// Reference chord.
    pub cref: f64,
    /// Reference span.
    pub bref: f64,
    /// Center of gravity.
    pub cg: Point3<f64>,
}

impl Default for ReferenceQuantities {
    fn default() -> Self {
        Self {
            sref: 1.0,
            cref: 1.0,
            bref: 1.0,
            cg: Point3::origin(),
        }
    }
}

/// Leading header of an aerodynamic database.
///
/// The node and triangle counts are implied by the loaded [`TriMesh`]
/// and are not stored here.
///
/// [`TriMesh`]: aero_types::TriMesh
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AdbHeader {
    /// Record layout revision.
    pub version: FileVersion,
    /// Aerodynamic model kind.
    pub model: ModelType,
    /// Symmetry flag as written by the solver.
    pub symmetry: i32,
    /// Time-analysis (unsteady) flag as written by the solver.
    pub unsteady: i32,
    /// Number of vortex loops per case.
    pub vortex_loop_count: usize,
    /// Number of surface vortex edges per case.
    pub vortex_edge_count: usize,
    /// Reference quantities.
    pub reference: ReferenceQuantities,
}

impl AdbHeader {
    /// Create a header for the given version and model.
    #[must_use]
    pub fn new(version: FileVersion, model: ModelType) -> Self {
        Self {
            version,
            model,
            ..Self::default()
        }
    }

    /// Set the per-case vortex loop and edge counts.
    #[must_use]
    pub const fn with_vortex_counts(mut self, loops: usize, edges: usize) -> Self {
        self.vortex_loop_count = loops;
        self.vortex_edge_count = edges;
        self
    }

    /// Set the reference quantities.
    #[must_use]
    pub const fn with_reference(mut self, reference: ReferenceQuantities) -> Self {
        self.reference = reference;
        self
    }

    /// Whether the solver ran an unsteady analysis.
    #[must_use]
    pub const fn is_unsteady(&self) -> bool {
        self.unsteady != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder() {
        let header = AdbHeader::new(FileVersion::V3, ModelType::Panel).with_vortex_counts(4, 9);
        assert_eq!(header.version, FileVersion::V3);
        assert_eq!(header.vortex_loop_count, 4);
        assert_eq!(header.vortex_edge_count, 9);
        assert!(!header.is_unsteady());
        assert!((header.reference.sref - 1.0).abs() < f64::EPSILON);
    }
}
