//! Node-and-triangle surface mesh.

use nalgebra::{Point3, Vector3};

use crate::{Aabb, Tri};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A triangle surface mesh as produced by the aerodynamic solver.
///
/// Nodes are immutable once loaded; downstream stages read the mesh by
/// reference and build their own derived data.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TriMesh {
    /// Node coordinates.
    pub nodes: Vec<Point3<f64>>,
    /// Triangles referencing `nodes`.
    pub tris: Vec<Tri>,
}

impl TriMesh {
    /// Create an empty mesh.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            nodes: Vec::new(),
            tris: Vec::new(),
        }
    }

    /// Create a mesh with pre-allocated capacity.
    #[inline]
    #[must_use]
    pub fn with_capacity(node_count: usize, tri_count: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(node_count),
            tris: Vec::with_capacity(tri_count),
        }
    }

    /// Build a mesh from raw positions and connectivity, filling each
    /// triangle's stored area from its geometry.
    ///
    /// # Example
    ///
    /// ```
    /// use aero_types::{Point3, TriMesh};
    ///
    /// let mesh = TriMesh::from_parts(
    ///     vec![
    ///         Point3::new(0.0, 0.0, 0.0),
    ///         Point3::new(2.0, 0.0, 0.0),
    ///         Point3::new(0.0, 2.0, 0.0),
    ///     ],
    ///     &[[0, 1, 2]],
    /// );
    /// assert!((mesh.tris[0].area - 2.0).abs() < 1e-12);
    /// ```
    #[must_use]
    pub fn from_parts(nodes: Vec<Point3<f64>>, faces: &[[u32; 3]]) -> Self {
        let mut mesh = Self {
            nodes,
            tris: faces.iter().map(|&f| Tri::new(f)).collect(),
        };
        for i in 0..mesh.tris.len() {
            mesh.tris[i].area = mesh.tri_area(i);
        }
        mesh
    }

    /// Number of nodes.
    #[inline]
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of triangles.
    #[inline]
    #[must_use]
    pub fn tri_count(&self) -> usize {
        self.tris.len()
    }

    /// True when the mesh has no triangles.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tris.is_empty()
    }

    /// The three corner positions of a triangle.
    #[must_use]
    pub fn corners(&self, tri: usize) -> [Point3<f64>; 3] {
        let [a, b, c] = self.tris[tri].nodes;
        [
            self.nodes[a as usize],
            self.nodes[b as usize],
            self.nodes[c as usize],
        ]
    }

    /// Un-normalized face normal `(p1 - p0) x (p2 - p0)`.
    #[must_use]
    pub fn tri_cross(&self, tri: usize) -> Vector3<f64> {
        let [p0, p1, p2] = self.corners(tri);
        (p1 - p0).cross(&(p2 - p0))
    }

    /// Geometric area of a triangle.
    #[must_use]
    pub fn tri_area(&self, tri: usize) -> f64 {
        0.5 * self.tri_cross(tri).norm()
    }

    /// Centroid of a triangle.
    #[must_use]
    pub fn tri_centroid(&self, tri: usize) -> Point3<f64> {
        let [p0, p1, p2] = self.corners(tri);
        Point3::from((p0.coords + p1.coords + p2.coords) / 3.0)
    }

    /// Bounding box of all nodes.
    #[must_use]
    pub fn bounds(&self) -> Aabb {
        Aabb::from_points(self.nodes.iter())
    }

    /// Triangle connectivity as plain index triplets.
    #[must_use]
    pub fn faces(&self) -> Vec<[u32; 3]> {
        self.tris.iter().map(|t| t.nodes).collect()
    }

    /// Area-weighted average of a per-triangle field onto nodes.
    ///
    /// Each triangle contributes `area * value` to its three nodes. Nodes
    /// that touch no area receive `0.0`.
    ///
    /// # Example
    ///
    /// ```
    /// use aero_types::{Point3, TriMesh};
    ///
    /// let mesh = TriMesh::from_parts(
    ///     vec![
    ///         Point3::new(0.0, 0.0, 0.0),
    ///         Point3::new(1.0, 0.0, 0.0),
    ///         Point3::new(0.0, 1.0, 0.0),
    ///         Point3::new(9.0, 9.0, 9.0),
    ///     ],
    ///     &[[0, 1, 2]],
    /// );
    /// let nodal = mesh.area_weighted_nodal(&[0.8]);
    /// assert!((nodal[0] - 0.8).abs() < 1e-12);
    /// assert_eq!(nodal[3], 0.0);
    /// ```
    #[must_use]
    pub fn area_weighted_nodal(&self, per_tri: &[f64]) -> Vec<f64> {
        let mut sum = vec![0.0; self.nodes.len()];
        let mut weight = vec![0.0; self.nodes.len()];

        for (tri, &value) in self.tris.iter().zip(per_tri) {
            for &n in &tri.nodes {
                sum[n as usize] += tri.area * value;
                weight[n as usize] += tri.area;
            }
        }

        sum.iter()
            .zip(&weight)
            .map(|(&s, &w)| if w > 0.0 { s / w } else { 0.0 })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn quad() -> TriMesh {
        TriMesh::from_parts(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            &[[0, 1, 2], [0, 2, 3]],
        )
    }

    #[test]
    fn areas_and_centroids() {
        let mesh = quad();
        assert_relative_eq!(mesh.tri_area(0), 0.5);
        let c = mesh.tri_centroid(1);
        assert_relative_eq!(c.x, 1.0 / 3.0);
        assert_relative_eq!(c.y, 2.0 / 3.0);
        assert!(mesh.tri_cross(0).z > 0.0);
    }

    #[test]
    fn nodal_average_weights_by_area() {
        let mut mesh = quad();
        mesh.tris[1].area = 1.5;
        let nodal = mesh.area_weighted_nodal(&[1.0, -1.0]);
        // node 0 touches both: (0.5*1 + 1.5*-1) / 2.0
        assert_relative_eq!(nodal[0], -0.5);
        assert_relative_eq!(nodal[1], 1.0);
        assert_relative_eq!(nodal[3], -1.0);
    }

    #[test]
    fn zero_area_nodes_get_zero() {
        let mut mesh = quad();
        mesh.tris[0].area = 0.0;
        mesh.tris[1].area = 0.0;
        let nodal = mesh.area_weighted_nodal(&[3.0, 4.0]);
        assert!(nodal.iter().all(|&v| v == 0.0));
    }
}
