//! Plane-edge slicing of a nodal scalar field.

use aero_topology::{Edge, build_topology};
use aero_types::{Aabb, Point3, TriMesh};
use tracing::{debug, info};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{SliceError, SliceResult};
use crate::intersect::segment_triangle_intersection;
use crate::params::SliceParams;
use crate::plane::CuttingPlane;

/// One crossing of an edge with a plane.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SlicePoint {
    /// Interpolated position.
    pub position: Point3<f64>,
    /// Interpolated scalar.
    pub value: f64,
    /// Edge that produced the point.
    pub edge: u32,
}

/// All crossings of one plane, in edge order.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SliceBlock {
    /// The plane.
    pub plane: CuttingPlane,
    /// Crossings, possibly none.
    pub points: Vec<SlicePoint>,
}

impl SliceBlock {
    /// Whether the plane missed the mesh.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

fn rotate(p: &Point3<f64>, rotation: Option<(f64, f64)>) -> Point3<f64> {
    match rotation {
        Some((cos, sin)) => Point3::new(p.x, p.y * cos - p.z * sin, p.y * sin - p.z * cos),
        None => *p,
    }
}

/// Intersect every plane with every edge.
///
/// `scalar` holds one value per node. Each edge contributes at most one
/// point per plane; the crossing parameter is clamped to the edge before
/// interpolating position and scalar.
///
/// # Errors
///
/// - [`SliceError::ScalarLengthMismatch`] if `scalar` and `nodes` differ in length
/// - [`SliceError::InvalidEdge`] if an edge references a missing node
///
/// # Example
///
/// ```
/// use aero_slice::{CuttingPlane, SliceParams, slice_planes};
/// use aero_topology::build_topology;
/// use aero_types::Point3;
///
/// let nodes = [
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// ];
/// let topo = build_topology(&[[0, 1, 2]]);
/// let blocks = slice_planes(
///     &nodes,
///     topo.edges(),
///     &[0.0, 2.0, 0.0],
///     &[CuttingPlane::x(0.5)],
///     &SliceParams::default(),
/// )
/// .unwrap();
///
/// assert_eq!(blocks[0].points.len(), 2);
/// assert!(blocks[0].points.iter().all(|p| (p.value - 1.0).abs() < 1e-9));
/// ```
pub fn slice_planes(
    nodes: &[Point3<f64>],
    edges: &[Edge],
    scalar: &[f64],
    planes: &[CuttingPlane],
    params: &SliceParams,
) -> SliceResult<Vec<SliceBlock>> {
    if scalar.len() != nodes.len() {
        return Err(SliceError::ScalarLengthMismatch {
            nodes: nodes.len(),
            values: scalar.len(),
        });
    }
    for (i, edge) in edges.iter().enumerate() {
        if let Some(&node) = edge.nodes.iter().find(|&&n| n as usize >= nodes.len()) {
            return Err(SliceError::InvalidEdge { edge: i, node });
        }
    }

    let rotation = params.rotation();
    let tested: Vec<Point3<f64>> = nodes.iter().map(|p| rotate(p, rotation)).collect();

    let blocks: Vec<SliceBlock> = planes
        .iter()
        .map(|plane| slice_one(plane, nodes, &tested, edges, scalar, params.extent))
        .collect();

    info!(
        planes = planes.len(),
        points = blocks.iter().map(|b| b.points.len()).sum::<usize>(),
        "Sliced surface"
    );
    Ok(blocks)
}

/// Build edge topology for `mesh` and slice it.
///
/// # Errors
///
/// As [`slice_planes`].
pub fn slice_mesh(
    mesh: &TriMesh,
    scalar: &[f64],
    planes: &[CuttingPlane],
    params: &SliceParams,
) -> SliceResult<Vec<SliceBlock>> {
    let topology = build_topology(&mesh.faces());
    slice_planes(&mesh.nodes, topology.edges(), scalar, planes, params)
}

fn slice_one(
    plane: &CuttingPlane,
    nodes: &[Point3<f64>],
    tested: &[Point3<f64>],
    edges: &[Edge],
    scalar: &[f64],
    extent: f64,
) -> SliceBlock {
    let quad = plane.quad(extent);
    let lower = [quad[0], quad[1], quad[3]];
    let upper = [quad[0], quad[3], quad[2]];
    let plane_box = plane.bounds(extent);

    let mut points = Vec::new();
    for (e, edge) in (0u32..).zip(edges) {
        let [na, nb] = edge.nodes.map(|n| n as usize);
        let (a, b) = (tested[na], tested[nb]);

        let edge_box = Aabb::from_points([a, b].iter());
        if !plane_box.overlaps_loose(&edge_box) {
            continue;
        }

        let Some(hit) = segment_triangle_intersection(lower, a, b)
            .or_else(|| segment_triangle_intersection(upper, a, b))
        else {
            continue;
        };

        let t = hit.t.clamp(0.0, 1.0);
        let (pa, pb) = (nodes[na], nodes[nb]);
        points.push(SlicePoint {
            position: pa + (pb - pa) * t,
            value: scalar[na] + t * (scalar[nb] - scalar[na]),
            edge: e,
        });
    }

    debug!(plane = %plane, points = points.len(), "Sliced plane");
    SliceBlock {
        plane: *plane,
        points,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aero_topology::build_topology;
    use approx::assert_relative_eq;

    fn unit_cube() -> (Vec<Point3<f64>>, Vec<[u32; 3]>) {
        let nodes = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(1.0, 0.0, 1.0),
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(0.0, 1.0, 1.0),
        ];
        let tris = vec![
            [0, 2, 1],
            [0, 3, 2],
            [4, 5, 6],
            [4, 6, 7],
            [0, 1, 5],
            [0, 5, 4],
            [2, 3, 7],
            [2, 7, 6],
            [1, 2, 6],
            [1, 6, 5],
            [0, 4, 7],
            [0, 7, 3],
        ];
        (nodes, tris)
    }

    #[test]
    fn cube_section_interpolates_linearly() {
        let (nodes, tris) = unit_cube();
        let topo = build_topology(&tris);
        assert!(topo.diagnostics().is_closed_manifold());
        let scalar: Vec<f64> = (0..8).map(f64::from).collect();

        let blocks = slice_planes(
            &nodes,
            topo.edges(),
            &scalar,
            &[CuttingPlane::x(0.5)],
            &SliceParams::default(),
        )
        .unwrap();
        let points = &blocks[0].points;
        assert!(!points.is_empty());
        for p in points {
            assert_relative_eq!(p.position.x, 0.5, epsilon = 1e-9);
            let edge = topo.edge(p.edge);
            let (a, b) = (edge.nodes[0] as usize, edge.nodes[1] as usize);
            assert_relative_eq!(p.value, 0.5 * (scalar[a] + scalar[b]), epsilon = 1e-9);
        }
        // Four x-aligned cube edges plus the diagonals of four side faces.
        assert_eq!(points.len(), 8);
    }

    #[test]
    fn plane_missing_mesh_gives_empty_block() {
        let (nodes, tris) = unit_cube();
        let topo = build_topology(&tris);
        let blocks = slice_planes(
            &nodes,
            topo.edges(),
            &[0.0; 8],
            &[CuttingPlane::z(5.0), CuttingPlane::y(0.5)],
            &SliceParams::default(),
        )
        .unwrap();
        assert!(blocks[0].is_empty());
        assert!(!blocks[1].is_empty());
    }

    #[test]
    fn scalar_length_is_checked() {
        let (nodes, tris) = unit_cube();
        let topo = build_topology(&tris);
        assert!(matches!(
            slice_planes(
                &nodes,
                topo.edges(),
                &[0.0; 3],
                &[CuttingPlane::x(0.5)],
                &SliceParams::default()
            ),
            Err(SliceError::ScalarLengthMismatch { nodes: 8, values: 3 })
        ));
    }

    #[test]
    fn rotation_moves_test_geometry_only() {
        // Segment along Y at z = 0; rotated 90 degrees it runs along Z.
        let nodes = [
            Point3::new(0.0, -1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
        ];
        let topo = build_topology(&[[0, 1, 2]]);
        let edge: Vec<Edge> = topo
            .edges()
            .iter()
            .copied()
            .filter(|e| e.nodes == [0, 1])
            .collect();

        let straight = slice_planes(
            &nodes,
            &edge,
            &[0.0, 1.0, 0.0],
            &[CuttingPlane::z(0.5)],
            &SliceParams::default(),
        )
        .unwrap();
        assert!(straight[0].is_empty());

        let rotated = slice_planes(
            &nodes,
            &edge,
            &[0.0, 1.0, 0.0],
            &[CuttingPlane::z(0.5)],
            &SliceParams::default().with_rotation_deg(90.0),
        )
        .unwrap();
        let p = rotated[0].points[0];
        // Unrotated output position, 3/4 along the edge.
        assert_relative_eq!(p.position.y, 0.5, epsilon = 1e-9);
        assert_relative_eq!(p.position.z, 0.0);
        assert_relative_eq!(p.value, 0.75, epsilon = 1e-9);
    }
}
