//! Mesh-section decoding.

use std::io::Read;

use aero_codec::BinaryReader;
use aero_types::{Point3, Tri, TriMesh, Vector3};
use tracing::{debug, info};

use crate::error::{AdbError, AdbResult, InSection, capacity, count};
use crate::format::{NAME_WIDTH, NOZZLE_RECORD_LEN, ROTOR_RECORD_LEN, ModelType, detect_version};
use crate::header::{AdbHeader, ReferenceQuantities};
use crate::mesh::{
    ComponentEntry, ComponentTables, ControlSurface, LevelEdge, LoadedAeroMesh, MeshLevel,
    PropulsionRecords,
};

/// Read the sentinel and the whole mesh section.
///
/// On return the reader's swap flag matches the file and the stream sits at
/// the first solution case.
///
/// # Errors
///
/// - [`AdbError::FormatVersionMismatch`] if the sentinel is unknown in both orders
/// - [`AdbError::Truncated`] if the stream ends inside a section
/// - [`AdbError::InvalidCount`] for negative counts or out-of-range indices
pub fn read_mesh<R: Read>(reader: &mut BinaryReader<R>) -> AdbResult<LoadedAeroMesh> {
    reader.set_swap(false);
    let sentinel: i32 = reader.read().in_section("sentinel")?;
    let (version, swapped) =
        detect_version(sentinel).ok_or(AdbError::FormatVersionMismatch { found: sentinel })?;
    reader.set_swap(swapped);
    debug!(?version, swapped, "Detected database version");

    let ints: [i32; 7] = reader.read_array().in_section("header")?;
    let floats: [f32; 6] = reader.read_array().in_section("header")?;
    let header = AdbHeader {
        version,
        model: ModelType::from_code(ints[0]),
        symmetry: ints[1],
        unsteady: ints[2],
        vortex_loop_count: count("vortex loop count", ints[3])?,
        vortex_edge_count: count("vortex edge count", ints[6])?,
        reference: ReferenceQuantities {
            sref: f64::from(floats[0]),
            cref: f64::from(floats[1]),
            bref: f64::from(floats[2]),
            cg: Point3::new(
                f64::from(floats[3]),
                f64::from(floats[4]),
                f64::from(floats[5]),
            ),
        },
    };
    let node_count = count("node count", ints[4])?;
    let tri_count = count("tri count", ints[5])?;

    let components = ComponentTables {
        wings: read_component_table(reader)?,
        bodies: read_component_table(reader)?,
        surfaces: read_component_table(reader)?,
    };

    let mesh = read_surface(reader, node_count, tri_count)?;
    let propulsion = read_propulsion(reader, version.has_nozzles())?;
    let mut levels = read_levels(reader)?;
    read_kutta_edges(reader, &mut levels)?;

    let kutta_count: i32 = reader.read().in_section("kutta nodes")?;
    let kutta_nodes = reader
        .read_vec(count("kutta node count", kutta_count)?)
        .in_section("kutta nodes")?;

    let control_surfaces = read_control_surfaces(reader)?;

    info!(
        nodes = mesh.node_count(),
        tris = mesh.tri_count(),
        levels = levels.len(),
        control_surfaces = control_surfaces.len(),
        "Loaded aerodynamic mesh"
    );

    Ok(LoadedAeroMesh {
        header,
        components,
        mesh,
        propulsion,
        levels,
        kutta_nodes,
        control_surfaces,
    })
}

pub(crate) fn read_point<R: Read>(
    reader: &mut BinaryReader<R>,
    section: &'static str,
) -> AdbResult<Point3<f64>> {
    let [x, y, z]: [f32; 3] = reader.read_array().in_section(section)?;
    Ok(Point3::new(f64::from(x), f64::from(y), f64::from(z)))
}

fn read_points<R: Read>(
    reader: &mut BinaryReader<R>,
    n: usize,
    section: &'static str,
) -> AdbResult<Vec<Point3<f64>>> {
    let raw: Vec<f32> = reader.read_vec(n.saturating_mul(3)).in_section(section)?;
    Ok(raw
        .chunks_exact(3)
        .map(|c| Point3::new(f64::from(c[0]), f64::from(c[1]), f64::from(c[2])))
        .collect())
}

fn read_component_table<R: Read>(reader: &mut BinaryReader<R>) -> AdbResult<Vec<ComponentEntry>> {
    let n: i32 = reader.read().in_section("component table")?;
    let n = count("component count", n)?;
    let mut entries = Vec::with_capacity(capacity(n));
    for _ in 0..n {
        let id: i32 = reader.read().in_section("component table")?;
        let name = reader.read_name(NAME_WIDTH).in_section("component table")?;
        let component_id: i32 = reader.read().in_section("component table")?;
        entries.push(ComponentEntry {
            id,
            name,
            component_id,
        });
    }
    Ok(entries)
}

fn node_index(raw: i32, node_count: usize) -> AdbResult<u32> {
    match u32::try_from(raw) {
        Ok(id) if id >= 1 && (id as usize) <= node_count => Ok(id - 1),
        _ => Err(AdbError::InvalidCount {
            what: "node id",
            value: i64::from(raw),
        }),
    }
}

fn read_surface<R: Read>(
    reader: &mut BinaryReader<R>,
    node_count: usize,
    tri_count: usize,
) -> AdbResult<TriMesh> {
    let mut mesh = TriMesh::with_capacity(capacity(node_count), capacity(tri_count));
    for _ in 0..tri_count {
        let ints: [i32; 5] = reader.read_array().in_section("triangles")?;
        let area: f32 = reader.read().in_section("triangles")?;
        let nodes = [
            node_index(ints[0], node_count)?,
            node_index(ints[1], node_count)?,
            node_index(ints[2], node_count)?,
        ];
        mesh.tris.push(
            Tri::new(nodes)
                .with_surface(ints[3], ints[4])
                .with_area(f64::from(area)),
        );
    }
    mesh.nodes = read_points(reader, node_count, "nodes")?;
    debug!(nodes = node_count, tris = tri_count, "Read surface mesh");
    Ok(mesh)
}

fn read_propulsion<R: Read>(
    reader: &mut BinaryReader<R>,
    has_nozzles: bool,
) -> AdbResult<PropulsionRecords> {
    let rotors: i32 = reader.read().in_section("propulsion")?;
    let rotors = count("rotor count", rotors)?;
    let nozzles = if has_nozzles {
        let n: i32 = reader.read().in_section("propulsion")?;
        count("nozzle count", n)?
    } else {
        0
    };

    let mut records = PropulsionRecords::default();
    for _ in 0..rotors {
        records.rotors.push(
            reader
                .read_array::<f64, ROTOR_RECORD_LEN>()
                .in_section("rotor records")?,
        );
    }
    for _ in 0..nozzles {
        records.nozzles.push(
            reader
                .read_array::<f64, NOZZLE_RECORD_LEN>()
                .in_section("nozzle records")?,
        );
    }
    Ok(records)
}

fn read_levels<R: Read>(reader: &mut BinaryReader<R>) -> AdbResult<Vec<MeshLevel>> {
    let n: i32 = reader.read().in_section("mesh levels")?;
    let n = count("mesh level count", n)?;
    let mut levels = Vec::with_capacity(capacity(n));
    for _ in 0..n {
        let [nodes, edges]: [i32; 2] = reader.read_array().in_section("mesh levels")?;
        let nodes = count("level node count", nodes)?;
        let edges = count("level edge count", edges)?;

        let level_nodes = read_points(reader, nodes, "level nodes")?;
        let mut level_edges = Vec::with_capacity(capacity(edges));
        for _ in 0..edges {
            let [surface, n1, n2]: [i32; 3] = reader.read_array().in_section("level edges")?;
            level_edges.push(LevelEdge {
                surface_id: surface.abs(),
                nodes: [node_index(n1, nodes)?, node_index(n2, nodes)?],
                boundary: surface < 0,
                kutta: false,
            });
        }
        levels.push(MeshLevel {
            nodes: level_nodes,
            edges: level_edges,
        });
    }
    Ok(levels)
}

fn read_kutta_edges<R: Read>(
    reader: &mut BinaryReader<R>,
    levels: &mut [MeshLevel],
) -> AdbResult<()> {
    let n: i32 = reader.read().in_section("kutta edges")?;
    let ids: Vec<i32> = reader
        .read_vec(count("kutta edge count", n)?)
        .in_section("kutta edges")?;
    for id in ids {
        let slot = usize::try_from(id)
            .ok()
            .and_then(|i| i.checked_sub(1))
            .and_then(|i| levels.first_mut()?.edges.get_mut(i))
            .ok_or(AdbError::InvalidCount {
                what: "kutta edge id",
                value: i64::from(id),
            })?;
        slot.kutta = true;
    }
    Ok(())
}

fn read_control_surfaces<R: Read>(
    reader: &mut BinaryReader<R>,
) -> AdbResult<Vec<ControlSurface>> {
    let n: i32 = reader.read().in_section("control surfaces")?;
    let n = count("control surface count", n)?;
    let mut surfaces = Vec::with_capacity(capacity(n));
    for _ in 0..n {
        let nodes: i32 = reader.read().in_section("control surfaces")?;
        let nodes = read_points(
            reader,
            count("control surface node count", nodes)?,
            "control surfaces",
        )?;
        let hinge_start = read_point(reader, "control surfaces")?;
        let hinge_end = read_point(reader, "control surfaces")?;
        let hinge_vector = read_point(reader, "control surfaces")?;
        let loops: i32 = reader.read().in_section("control surfaces")?;
        let loops = reader
            .read_vec(count("control surface loop count", loops)?)
            .in_section("control surfaces")?;
        surfaces.push(ControlSurface {
            nodes,
            hinge_start,
            hinge_end,
            hinge_vector: Vector3::new(hinge_vector.x, hinge_vector.y, hinge_vector.z),
            loops,
        });
    }
    Ok(surfaces)
}
