//! Interpolation results.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::mesh::LoadSample;

/// How a donor was accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DonorKind {
    /// The destination point projects inside the donor stencil.
    Contained,
    /// No stencil contained the point; the closest centroid was used.
    Nearest,
}

/// The source triangle a destination element takes its load from.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Donor {
    /// Source triangle index.
    pub tri: u32,
    /// Source node indices.
    pub nodes: [u32; 3],
    /// Barycentric weights of `nodes`, summing to one.
    pub weights: [f64; 3],
    /// Acceptance kind.
    pub kind: DonorKind,
    /// Squared distance used for acceptance: to the projected point for
    /// [`DonorKind::Contained`], to the donor centroid otherwise.
    pub distance_sq: f64,
}

/// Why a destination element has no load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MissReason {
    /// Centroid outside the tolerance-inflated source bounds.
    OutsideBounds,
    /// Strict mode and no stencil contained the point.
    NoContainment,
    /// A donor was found but lies too far from the point.
    TooFar,
    /// The donor sits on the other side of the symmetry plane.
    WrongSide,
}

impl fmt::Display for MissReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::OutsideBounds => "outside source bounds",
            Self::NoContainment => "no containing source triangle",
            Self::TooFar => "donor too far",
            Self::WrongSide => "donor across symmetry plane",
        })
    }
}

/// A destination element left without a load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct InterpolationMiss {
    /// Destination triangle index.
    pub index: usize,
    /// Destination element id.
    pub element: u32,
    /// Cause.
    pub reason: MissReason,
}

/// Counts gathered over a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TransferReport {
    /// Destination triangles processed.
    pub destination_tris: usize,
    /// Triangles that received a load.
    pub interpolated: usize,
    /// Accepted donors of kind [`DonorKind::Contained`].
    pub contained: usize,
    /// Accepted donors of kind [`DonorKind::Nearest`].
    pub nearest: usize,
    /// Triangles that needed the normal check relaxed.
    pub normals_relaxed: usize,
    /// Triangles without a load.
    pub misses: usize,
}

/// Loads transferred onto a destination mesh.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Transfer {
    /// Load per destination triangle; `None` for misses.
    pub loads: Vec<Option<LoadSample>>,
    /// Donor per destination triangle, kept for distance and symmetry
    /// misses so they can be inspected.
    pub donors: Vec<Option<Donor>>,
    /// Every destination triangle without a load.
    pub misses: Vec<InterpolationMiss>,
    /// Summary counts.
    pub report: TransferReport,
}

impl Transfer {
    /// Loads with misses replaced by zero.
    ///
    /// Use only where a zero load is an acceptable stand-in, such as when
    /// writing a structural deck that needs a value per element.
    #[must_use]
    pub fn loads_or_zero(&self) -> Vec<LoadSample> {
        self.loads.iter().map(|l| l.unwrap_or_default()).collect()
    }

    /// Whether every destination triangle received a load.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.misses.is_empty()
    }

    /// Number of misses.
    #[must_use]
    pub fn miss_count(&self) -> usize {
        self.misses.len()
    }

    /// Misses with the given reason.
    pub fn misses_for(&self, reason: MissReason) -> impl Iterator<Item = &InterpolationMiss> {
        self.misses.iter().filter(move |m| m.reason == reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_fill_is_explicit() {
        let t = Transfer {
            loads: vec![Some(LoadSample::cp(0.5)), None],
            donors: vec![None, None],
            misses: vec![InterpolationMiss {
                index: 1,
                element: 7,
                reason: MissReason::TooFar,
            }],
            report: TransferReport::default(),
        };
        assert!(!t.is_complete());
        assert_eq!(t.loads_or_zero()[1], LoadSample::default());
        assert_eq!(t.misses_for(MissReason::TooFar).count(), 1);
        assert_eq!(t.misses_for(MissReason::WrongSide).count(), 0);
    }
}
