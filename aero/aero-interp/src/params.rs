//! Interpolation parameters.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Reflection applied to destination points before the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Symmetry {
    /// No reflection.
    #[default]
    Off,
    /// The source covers `y >= 0`; points with `y < 0` are mirrored.
    PositiveY,
    /// The source covers `y <= 0`; points with `y > 0` are mirrored.
    NegativeY,
}

/// Parameters for [`interpolate`](crate::interpolate).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct InterpParams {
    /// Half-model reflection.
    pub symmetry: Symmetry,
    /// Skip the source bounding-box pre-rejection (default: false).
    pub ignore_bounding_box: bool,
    /// Report a miss instead of retrying with normal checks relaxed
    /// (default: false).
    pub strict: bool,
    /// Flip every source normal before matching (default: false).
    pub swap_normals: bool,
    /// Largest angle between source and destination normals, in degrees
    /// (default: 25).
    pub max_normal_angle_deg: f64,
}

impl Default for InterpParams {
    fn default() -> Self {
        Self {
            symmetry: Symmetry::Off,
            ignore_bounding_box: false,
            strict: false,
            swap_normals: false,
            max_normal_angle_deg: 25.0,
        }
    }
}

impl InterpParams {
    /// Settings for a thick panel-method source (the default).
    #[must_use]
    pub fn panel() -> Self {
        Self::default()
    }

    /// Settings for a zero-thickness vortex-lattice source.
    ///
    /// The lifting surface sits inside the structural skin, so the bounding
    /// box test is meaningless and only contained matches are trusted.
    #[must_use]
    pub fn vortex_lattice() -> Self {
        Self {
            ignore_bounding_box: true,
            strict: true,
            ..Self::default()
        }
    }

    /// Set the symmetry mode.
    #[must_use]
    pub const fn with_symmetry(mut self, symmetry: Symmetry) -> Self {
        self.symmetry = symmetry;
        self
    }

    /// Skip or apply the bounding-box pre-rejection.
    #[must_use]
    pub const fn with_ignore_bounding_box(mut self, ignore: bool) -> Self {
        self.ignore_bounding_box = ignore;
        self
    }

    /// Enable or disable strict containment.
    #[must_use]
    pub const fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Flip source normals.
    #[must_use]
    pub const fn with_swap_normals(mut self, swap: bool) -> Self {
        self.swap_normals = swap;
        self
    }

    /// Set the normal angle limit in degrees.
    #[must_use]
    pub const fn with_max_normal_angle(mut self, degrees: f64) -> Self {
        self.max_normal_angle_deg = degrees;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets() {
        let vlm = InterpParams::vortex_lattice();
        assert!(vlm.ignore_bounding_box && vlm.strict);
        assert_eq!(InterpParams::panel(), InterpParams::default());
        assert_eq!(vlm.symmetry, Symmetry::Off);
    }

    #[test]
    fn builder_chain() {
        let p = InterpParams::default()
            .with_symmetry(Symmetry::PositiveY)
            .with_swap_normals(true)
            .with_max_normal_angle(45.0);
        assert!(p.swap_normals);
        assert!((p.max_normal_angle_deg - 45.0).abs() < f64::EPSILON);
    }
}
