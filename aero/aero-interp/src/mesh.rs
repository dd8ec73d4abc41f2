//! Interpolation meshes and the loads they carry.

use std::ops::{Add, Mul};

use aero_types::Point3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{InterpError, InterpResult};

/// Per-triangle solution channels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LoadSample {
    /// Pressure coefficient (or pressure jump for lifting surfaces).
    pub cp: f64,
    /// Unsteady pressure coefficient.
    pub cp_unsteady: f64,
    /// Circulation.
    pub gamma: f64,
}

impl LoadSample {
    /// Create a sample.
    #[must_use]
    pub const fn new(cp: f64, cp_unsteady: f64, gamma: f64) -> Self {
        Self {
            cp,
            cp_unsteady,
            gamma,
        }
    }

    /// A sample carrying only Cp.
    #[must_use]
    pub const fn cp(cp: f64) -> Self {
        Self::new(cp, 0.0, 0.0)
    }

    /// Clamp every channel to the range spanned by three samples.
    #[must_use]
    pub fn clamp_to(self, bounds: &[Self; 3]) -> Self {
        let clamp = |v: f64, f: fn(&Self) -> f64| {
            let lo = bounds.iter().map(f).fold(f64::INFINITY, f64::min);
            let hi = bounds.iter().map(f).fold(f64::NEG_INFINITY, f64::max);
            v.max(lo).min(hi)
        };
        Self {
            cp: clamp(self.cp, |s| s.cp),
            cp_unsteady: clamp(self.cp_unsteady, |s| s.cp_unsteady),
            gamma: clamp(self.gamma, |s| s.gamma),
        }
    }
}

impl Add for LoadSample {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(
            self.cp + rhs.cp,
            self.cp_unsteady + rhs.cp_unsteady,
            self.gamma + rhs.gamma,
        )
    }
}

impl Mul<f64> for LoadSample {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self::new(self.cp * rhs, self.cp_unsteady * rhs, self.gamma * rhs)
    }
}

/// A triangle mesh as seen by the interpolator.
///
/// Each triangle carries an external element id (1-based by default) so
/// results can be traced back to the structural deck or solver mesh.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct InterpMesh {
    /// Node positions.
    pub nodes: Vec<Point3<f64>>,
    /// Triangle corner indices into `nodes`.
    pub tris: Vec<[u32; 3]>,
    /// External id of each triangle.
    pub element_ids: Vec<u32>,
    /// Optional per-triangle loads.
    pub loads: Option<Vec<LoadSample>>,
}

impl InterpMesh {
    /// Create a mesh without loads, numbering elements from 1.
    #[must_use]
    pub fn new(nodes: Vec<Point3<f64>>, tris: Vec<[u32; 3]>) -> Self {
        let element_ids = (1..).take(tris.len()).collect();
        Self {
            nodes,
            tris,
            element_ids,
            loads: None,
        }
    }

    /// Replace the element ids.
    #[must_use]
    pub fn with_element_ids(mut self, ids: Vec<u32>) -> Self {
        self.element_ids = ids;
        self
    }

    /// Attach per-triangle loads.
    #[must_use]
    pub fn with_loads(mut self, loads: Vec<LoadSample>) -> Self {
        self.loads = Some(loads);
        self
    }

    /// Number of triangles.
    #[must_use]
    pub fn tri_count(&self) -> usize {
        self.tris.len()
    }

    /// Corner positions of triangle `i`.
    #[must_use]
    pub fn corners(&self, i: usize) -> [Point3<f64>; 3] {
        self.tris[i].map(|n| self.nodes[n as usize])
    }

    /// Append a reversed-winding copy of every triangle on duplicated nodes.
    ///
    /// A vortex-lattice solution stores one pressure jump per panel of a
    /// zero-thickness surface. The structural skin has an upper and a lower
    /// side, so the original triangles carry `scale · jump` and the copies,
    /// wound `(n3, n2, n1)` so their normals face the other way, carry
    /// `-scale · jump`. Circulation is copied unchanged. The copies use
    /// their own nodes so nodal averaging never mixes the two sides.
    ///
    /// # Example
    ///
    /// ```
    /// use aero_interp::{InterpMesh, LoadSample};
    /// use aero_types::Point3;
    ///
    /// let mesh = InterpMesh::new(
    ///     vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0), Point3::new(0.0, 1.0, 0.0)],
    ///     vec![[0, 1, 2]],
    /// )
    /// .with_loads(vec![LoadSample::cp(0.8)])
    /// .with_lifting_surface_mirror(0.5);
    ///
    /// assert_eq!(mesh.tris, vec![[0, 1, 2], [5, 4, 3]]);
    /// let loads = mesh.loads.unwrap();
    /// assert_eq!(loads[0].cp, 0.4);
    /// assert_eq!(loads[1].cp, -0.4);
    /// ```
    #[must_use]
    pub fn with_lifting_surface_mirror(mut self, scale: f64) -> Self {
        #[allow(clippy::cast_possible_truncation)]
        let offset = self.nodes.len() as u32;
        self.nodes.extend_from_within(..);

        let mirrored: Vec<[u32; 3]> = self
            .tris
            .iter()
            .map(|&[a, b, c]| [c + offset, b + offset, a + offset])
            .collect();
        self.tris.extend(mirrored);
        self.element_ids.extend_from_within(..);

        if let Some(loads) = self.loads.as_mut() {
            let lower: Vec<LoadSample> = loads
                .iter()
                .map(|s| LoadSample::new(-scale * s.cp, -scale * s.cp_unsteady, s.gamma))
                .collect();
            for s in loads.iter_mut() {
                s.cp *= scale;
                s.cp_unsteady *= scale;
            }
            loads.extend(lower);
        }
        self
    }

    /// Check indices and per-triangle array lengths.
    ///
    /// # Errors
    ///
    /// [`InterpError::InvalidNode`] or [`InterpError::LengthMismatch`].
    pub fn validate(&self) -> InterpResult<()> {
        let tris = self.tris.len();
        if self.element_ids.len() != tris {
            return Err(InterpError::LengthMismatch {
                what: "element ids",
                tris,
                found: self.element_ids.len(),
            });
        }
        if let Some(loads) = &self.loads {
            if loads.len() != tris {
                return Err(InterpError::LengthMismatch {
                    what: "loads",
                    tris,
                    found: loads.len(),
                });
            }
        }
        for (tri, corners) in self.tris.iter().enumerate() {
            if let Some(&node) = corners.iter().find(|&&n| n as usize >= self.nodes.len()) {
                return Err(InterpError::InvalidNode { tri, node });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn tri() -> InterpMesh {
        InterpMesh::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2]],
        )
    }

    #[test]
    fn default_ids_are_one_based() {
        assert_eq!(tri().element_ids, vec![1]);
    }

    #[test]
    fn mirror_without_loads_doubles_geometry() {
        let mesh = tri().with_lifting_surface_mirror(0.5);
        assert_eq!(mesh.nodes.len(), 6);
        assert_eq!(mesh.element_ids, vec![1, 1]);
        assert!(mesh.loads.is_none());
        mesh.validate().unwrap();
    }

    #[test]
    fn mirror_keeps_gamma() {
        let mesh = tri()
            .with_loads(vec![LoadSample::new(1.0, 2.0, 3.0)])
            .with_lifting_surface_mirror(0.5);
        let loads = mesh.loads.unwrap();
        assert_relative_eq!(loads[1].cp_unsteady, -1.0);
        assert_relative_eq!(loads[1].gamma, 3.0);
    }

    #[test]
    fn clamp_per_channel() {
        let bounds = [
            LoadSample::new(0.0, -1.0, 5.0),
            LoadSample::new(1.0, 0.0, 5.0),
            LoadSample::new(0.5, 1.0, 6.0),
        ];
        let s = LoadSample::new(2.0, 0.5, 0.0).clamp_to(&bounds);
        assert_eq!(s, LoadSample::new(1.0, 0.5, 5.0));
    }

    #[test]
    fn validate_catches_bad_input() {
        let mut mesh = tri();
        mesh.tris.push([0, 1, 9]);
        assert!(matches!(
            mesh.validate(),
            Err(InterpError::LengthMismatch { what: "element ids", .. })
        ));
        mesh.element_ids.push(2);
        assert!(matches!(
            mesh.validate(),
            Err(InterpError::InvalidNode { tri: 1, node: 9 })
        ));
    }
}
