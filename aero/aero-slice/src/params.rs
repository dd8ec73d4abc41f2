//! Slicing parameters.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::plane::DEFAULT_EXTENT;

/// Parameters for [`slice_planes`](crate::slice_planes).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SliceParams {
    /// Half-width of the quad that represents each plane.
    pub extent: f64,
    /// Rotation about X, in degrees, applied to nodes before the
    /// intersection test. Emitted positions are never rotated.
    pub rotation_deg: Option<f64>,
}

impl Default for SliceParams {
    fn default() -> Self {
        Self {
            extent: DEFAULT_EXTENT,
            rotation_deg: None,
        }
    }
}

impl SliceParams {
    /// Set the quad half-width.
    #[must_use]
    pub const fn with_extent(mut self, extent: f64) -> Self {
        self.extent = extent;
        self
    }

    /// Rotate node coordinates about X before testing.
    #[must_use]
    pub const fn with_rotation_deg(mut self, degrees: f64) -> Self {
        self.rotation_deg = Some(degrees);
        self
    }

    /// `(cos, sin)` of the rotation, if any.
    pub(crate) fn rotation(&self) -> Option<(f64, f64)> {
        self.rotation_deg.map(|deg| {
            let (sin, cos) = deg.to_radians().sin_cos();
            (cos, sin)
        })
    }
}
