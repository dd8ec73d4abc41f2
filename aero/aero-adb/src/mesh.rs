//! Mesh-section values of a loaded database.

use aero_types::{Point3, TriMesh, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::format::{NOZZLE_RECORD_LEN, ROTOR_RECORD_LEN};
use crate::header::AdbHeader;

/// One row of a named-component table.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ComponentEntry {
    /// Table-local id.
    pub id: i32,
    /// Component name, at most 99 bytes when written.
    pub name: String,
    /// Geometry component id.
    pub component_id: i32,
}

impl ComponentEntry {
    /// Create an entry.
    #[must_use]
    pub fn new(id: i32, name: impl Into<String>, component_id: i32) -> Self {
        Self {
            id,
            name: name.into(),
            component_id,
        }
    }
}

/// Named-component tables in file order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ComponentTables {
    /// Lifting surfaces.
    pub wings: Vec<ComponentEntry>,
    /// Bodies of revolution.
    pub bodies: Vec<ComponentEntry>,
    /// Parametric surfaces.
    pub surfaces: Vec<ComponentEntry>,
}

/// Opaque propulsion records.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PropulsionRecords {
    /// Rotor records.
    pub rotors: Vec<[f64; ROTOR_RECORD_LEN]>,
    /// Nozzle records. Always empty for v2 files.
    pub nozzles: Vec<[f64; NOZZLE_RECORD_LEN]>,
}

/// Edge of a multigrid level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LevelEdge {
    /// Owning surface id (always non-negative).
    pub surface_id: i32,
    /// End nodes, 0-based into the level's node list.
    pub nodes: [u32; 2],
    /// Marked as a boundary edge (negative surface id in the file).
    pub boundary: bool,
    /// Listed as a Kutta edge (level 1 only).
    pub kutta: bool,
}

/// One coarsened multigrid mesh.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MeshLevel {
    /// Level nodes.
    pub nodes: Vec<Point3<f64>>,
    /// Level edges.
    pub edges: Vec<LevelEdge>,
}

/// Control-surface definition.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ControlSurface {
    /// Outline nodes.
    pub nodes: Vec<Point3<f64>>,
    /// First hinge node.
    pub hinge_start: Point3<f64>,
    /// Second hinge node.
    pub hinge_end: Point3<f64>,
    /// Hinge axis.
    pub hinge_vector: Vector3<f64>,
    /// Vortex loops moved by the deflection.
    pub loops: Vec<i32>,
}

/// Sizes of the per-case arrays, fixed by the mesh section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaseLayout {
    /// Vortex loops.
    pub vortex_loops: usize,
    /// Surface vortex edges.
    pub vortex_edges: usize,
    /// Triangles.
    pub tris: usize,
    /// Control surfaces.
    pub control_surfaces: usize,
}

/// Everything read before the first solution case.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LoadedAeroMesh {
    /// Header fields.
    pub header: AdbHeader,
    /// Named-component tables.
    pub components: ComponentTables,
    /// Surface triangulation.
    pub mesh: TriMesh,
    /// Rotor and nozzle records.
    pub propulsion: PropulsionRecords,
    /// Multigrid hierarchy, finest first.
    pub levels: Vec<MeshLevel>,
    /// Kutta node ids as written.
    pub kutta_nodes: Vec<i32>,
    /// Control surfaces.
    pub control_surfaces: Vec<ControlSurface>,
}

impl LoadedAeroMesh {
    /// Create an empty database around a surface mesh.
    #[must_use]
    pub fn new(header: AdbHeader, mesh: TriMesh) -> Self {
        Self {
            header,
            mesh,
            ..Self::default()
        }
    }

    /// Array sizes of every case block.
    #[must_use]
    pub fn case_layout(&self) -> CaseLayout {
        CaseLayout {
            vortex_loops: self.header.vortex_loop_count,
            vortex_edges: self.header.vortex_edge_count,
            tris: self.mesh.tri_count(),
            control_surfaces: self.control_surfaces.len(),
        }
    }

    /// Node pairs of the Kutta edges on the finest level.
    #[must_use]
    pub fn kutta_edge_pairs(&self) -> Vec<[u32; 2]> {
        self.levels
            .first()
            .map(|level| {
                level
                    .edges
                    .iter()
                    .filter(|e| e.kutta)
                    .map(|e| e.nodes)
                    .collect()
            })
            .unwrap_or_default()
    }
}
