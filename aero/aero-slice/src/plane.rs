//! Axis-aligned cutting planes.

use std::fmt;

use aero_types::{Aabb, Axis, Point3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Half-width of the quad that stands in for an infinite plane.
pub const DEFAULT_EXTENT: f64 = 1.0e6;

/// The plane `axis = value`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CuttingPlane {
    /// Normal axis.
    pub axis: Axis,
    /// Offset along the axis.
    pub value: f64,
}

impl CuttingPlane {
    /// Create a plane.
    #[must_use]
    pub const fn new(axis: Axis, value: f64) -> Self {
        Self { axis, value }
    }

    /// Shorthand for `x = value`.
    #[must_use]
    pub const fn x(value: f64) -> Self {
        Self::new(Axis::X, value)
    }

    /// Shorthand for `y = value`.
    #[must_use]
    pub const fn y(value: f64) -> Self {
        Self::new(Axis::Y, value)
    }

    /// Shorthand for `z = value`.
    #[must_use]
    pub const fn z(value: f64) -> Self {
        Self::new(Axis::Z, value)
    }

    /// Corners of the finite quad representing this plane.
    ///
    /// The quad is split into triangles (0,1,3) and (0,3,2).
    ///
    /// # Example
    ///
    /// ```
    /// use aero_slice::CuttingPlane;
    ///
    /// let quad = CuttingPlane::x(0.5).quad(10.0);
    /// assert!(quad.iter().all(|p| p.x == 0.5));
    /// assert_eq!(quad[3].y, 10.0);
    /// ```
    #[must_use]
    pub fn quad(&self, extent: f64) -> [Point3<f64>; 4] {
        let (v, e) = (self.value, extent);
        match self.axis {
            Axis::X => [
                Point3::new(v, -e, -e),
                Point3::new(v, e, -e),
                Point3::new(v, -e, e),
                Point3::new(v, e, e),
            ],
            Axis::Y => [
                Point3::new(-e, v, -e),
                Point3::new(-e, v, e),
                Point3::new(e, v, -e),
                Point3::new(e, v, e),
            ],
            Axis::Z => [
                Point3::new(-e, -e, v),
                Point3::new(e, -e, v),
                Point3::new(-e, e, v),
                Point3::new(e, e, v),
            ],
        }
    }

    /// Bounding box of [`CuttingPlane::quad`].
    #[must_use]
    pub fn bounds(&self, extent: f64) -> Aabb {
        Aabb::from_points(self.quad(extent).iter())
    }
}

impl fmt::Display for CuttingPlane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.axis, self.value)
    }
}
