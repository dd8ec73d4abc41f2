//! Per-triangle geometry shared by source and destination meshes.

use aero_types::{Aabb, Point3, Vector3};

use crate::mesh::{InterpMesh, LoadSample};

/// Centroids, unit normals, areas and bounds of a mesh.
#[derive(Debug, Clone)]
pub(crate) struct MeshGeometry {
    pub centroids: Vec<Point3<f64>>,
    pub normals: Vec<Vector3<f64>>,
    pub areas: Vec<f64>,
    pub bounds: Aabb,
}

impl MeshGeometry {
    pub fn new(mesh: &InterpMesh) -> Self {
        let n = mesh.tri_count();
        let mut centroids = Vec::with_capacity(n);
        let mut normals = Vec::with_capacity(n);
        let mut areas = Vec::with_capacity(n);

        for i in 0..n {
            let [a, b, c] = mesh.corners(i);
            centroids.push(Point3::from((a.coords + b.coords + c.coords) / 3.0));
            let cross = (b - a).cross(&(c - a));
            let twice_area = cross.norm();
            areas.push(0.5 * twice_area);
            // Degenerate triangles keep a zero normal and never pass the
            // normal test.
            normals.push(if twice_area > 0.0 {
                cross / twice_area
            } else {
                Vector3::zeros()
            });
        }

        Self {
            centroids,
            normals,
            areas,
            bounds: Aabb::from_points(mesh.nodes.iter()),
        }
    }

    pub fn flip_normals(&mut self) {
        for n in &mut self.normals {
            *n = -*n;
        }
    }

    /// Largest centroid-to-corner distance over all triangles.
    pub fn reach(&self, mesh: &InterpMesh) -> f64 {
        self.centroids
            .iter()
            .enumerate()
            .flat_map(|(i, c)| mesh.corners(i).map(|p| (p - c).norm()))
            .fold(0.0, f64::max)
    }
}

/// Area-weighted average of per-triangle loads onto nodes.
///
/// Nodes touched only by zero-area triangles, or by none, get zero.
pub(crate) fn nodal_loads(mesh: &InterpMesh, areas: &[f64], loads: &[LoadSample]) -> Vec<LoadSample> {
    let mut sum = vec![LoadSample::default(); mesh.nodes.len()];
    let mut weight = vec![0.0; mesh.nodes.len()];
    for ((tri, &area), &load) in mesh.tris.iter().zip(areas).zip(loads) {
        for &n in tri {
            sum[n as usize] = sum[n as usize] + load * area;
            weight[n as usize] += area;
        }
    }
    sum.into_iter()
        .zip(weight)
        .map(|(s, w)| if w > 0.0 { s * (1.0 / w) } else { LoadSample::default() })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn pair() -> InterpMesh {
        InterpMesh::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(2.0, 0.0, 0.0),
                Point3::new(2.0, 2.0, 0.0),
                Point3::new(0.0, 2.0, 0.0),
                Point3::new(9.0, 9.0, 9.0),
            ],
            vec![[0, 1, 2], [0, 2, 3]],
        )
    }

    #[test]
    fn geometry_of_square() {
        let mesh = pair();
        let g = MeshGeometry::new(&mesh);
        assert_relative_eq!(g.areas[0], 2.0);
        assert_relative_eq!(g.normals[1].z, 1.0);
        assert_relative_eq!(g.centroids[0].x, 4.0 / 3.0);
        assert_relative_eq!(g.bounds.max.z, 9.0);
    }

    #[test]
    fn nodal_average_and_orphans() {
        let mesh = pair();
        let g = MeshGeometry::new(&mesh);
        let nodal = nodal_loads(&mesh, &g.areas, &[LoadSample::cp(1.0), LoadSample::cp(3.0)]);
        assert_relative_eq!(nodal[0].cp, 2.0);
        assert_relative_eq!(nodal[1].cp, 1.0);
        assert_relative_eq!(nodal[4].cp, 0.0);
    }

    #[test]
    fn reach_covers_corners() {
        let mesh = pair();
        let g = MeshGeometry::new(&mesh);
        // Distance from (4/3, 2/3) to (0, 0).
        assert_relative_eq!(g.reach(&mesh), (16.0_f64 / 9.0 + 4.0 / 9.0).sqrt());
    }
}
