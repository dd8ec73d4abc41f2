//! Database encoding.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use aero_codec::{BinaryWriter, CodecResult};
use aero_types::Point3;
use tracing::info;

use crate::case::{SolutionCase, write_case};
use crate::case_list::{CaseListEntry, format_case_list};
use crate::error::{AdbError, AdbResult};
use crate::format::NAME_WIDTH;
use crate::mesh::{ComponentEntry, LoadedAeroMesh};

#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
const fn int(n: usize) -> i32 {
    n as i32
}

#[allow(clippy::cast_possible_truncation)]
fn point<W: Write>(writer: &mut BinaryWriter<W>, p: &Point3<f64>) -> CodecResult<()> {
    writer.write_all(&[p.x as f32, p.y as f32, p.z as f32])
}

fn component_table<W: Write>(
    writer: &mut BinaryWriter<W>,
    table: &[ComponentEntry],
) -> CodecResult<()> {
    writer.write(int(table.len()))?;
    for entry in table {
        writer.write(entry.id)?;
        writer.write_name(&entry.name, NAME_WIDTH)?;
        writer.write(entry.component_id)?;
    }
    Ok(())
}

#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
fn mesh_section<W: Write>(writer: &mut BinaryWriter<W>, db: &LoadedAeroMesh) -> CodecResult<()> {
    let header = &db.header;
    let reference = &header.reference;

    writer.write(header.version.magic())?;
    writer.write_all(&[
        header.model.code(),
        header.symmetry,
        header.unsteady,
        int(header.vortex_loop_count),
        int(db.mesh.node_count()),
        int(db.mesh.tri_count()),
        int(header.vortex_edge_count),
    ])?;
    writer.write_all(&[
        reference.sref as f32,
        reference.cref as f32,
        reference.bref as f32,
        reference.cg.x as f32,
        reference.cg.y as f32,
        reference.cg.z as f32,
    ])?;

    component_table(writer, &db.components.wings)?;
    component_table(writer, &db.components.bodies)?;
    component_table(writer, &db.components.surfaces)?;

    for tri in &db.mesh.tris {
        writer.write_all(&[
            tri.nodes[0] as i32 + 1,
            tri.nodes[1] as i32 + 1,
            tri.nodes[2] as i32 + 1,
            tri.surface_type,
            tri.surface_id,
        ])?;
        writer.write(tri.area as f32)?;
    }
    for node in &db.mesh.nodes {
        point(writer, node)?;
    }

    writer.write(int(db.propulsion.rotors.len()))?;
    if header.version.has_nozzles() {
        writer.write(int(db.propulsion.nozzles.len()))?;
    }
    for rotor in &db.propulsion.rotors {
        writer.write_all(rotor)?;
    }
    if header.version.has_nozzles() {
        for nozzle in &db.propulsion.nozzles {
            writer.write_all(nozzle)?;
        }
    }

    writer.write(int(db.levels.len()))?;
    for level in &db.levels {
        writer.write_all(&[int(level.nodes.len()), int(level.edges.len())])?;
        for node in &level.nodes {
            point(writer, node)?;
        }
        for edge in &level.edges {
            let surface = if edge.boundary {
                -edge.surface_id.abs()
            } else {
                edge.surface_id
            };
            writer.write_all(&[
                surface,
                edge.nodes[0] as i32 + 1,
                edge.nodes[1] as i32 + 1,
            ])?;
        }
    }

    let kutta: Vec<i32> = db
        .levels
        .first()
        .map(|level| {
            level
                .edges
                .iter()
                .enumerate()
                .filter(|(_, e)| e.kutta)
                .map(|(i, _)| int(i + 1))
                .collect()
        })
        .unwrap_or_default();
    writer.write(int(kutta.len()))?;
    writer.write_all(&kutta)?;

    writer.write(int(db.kutta_nodes.len()))?;
    writer.write_all(&db.kutta_nodes)?;

    writer.write(int(db.control_surfaces.len()))?;
    for surface in &db.control_surfaces {
        writer.write(int(surface.nodes.len()))?;
        for node in &surface.nodes {
            point(writer, node)?;
        }
        point(writer, &surface.hinge_start)?;
        point(writer, &surface.hinge_end)?;
        point(writer, &Point3::from(surface.hinge_vector))?;
        writer.write(int(surface.loops.len()))?;
        writer.write_all(&surface.loops)?;
    }
    Ok(())
}

/// Encode a database: the mesh section followed by every case block.
///
/// The writer's swap flag selects the byte order. Only v3 databases emit
/// nozzle records.
///
/// # Errors
///
/// Returns [`AdbError::Write`] on stream failure.
///
/// # Example
///
/// ```
/// use aero_adb::{AdbHeader, FileVersion, LoadedAeroMesh, ModelType, read_mesh, write_adb};
/// use aero_codec::{BinaryReader, BinaryWriter};
/// use aero_types::{Point3, TriMesh};
///
/// let mesh = TriMesh::from_parts(
///     vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0), Point3::new(0.0, 1.0, 0.0)],
///     &[[0, 1, 2]],
/// );
/// let db = LoadedAeroMesh::new(AdbHeader::new(FileVersion::V3, ModelType::Panel), mesh);
///
/// let mut writer = BinaryWriter::new(Vec::new());
/// write_adb(&mut writer, &db, &[]).unwrap();
/// let bytes = writer.into_inner();
///
/// let back = read_mesh(&mut BinaryReader::new(bytes.as_slice())).unwrap();
/// assert_eq!(back, db);
/// ```
pub fn write_adb<W: Write>(
    writer: &mut BinaryWriter<W>,
    db: &LoadedAeroMesh,
    cases: &[SolutionCase],
) -> AdbResult<()> {
    mesh_section(writer, db).map_err(AdbError::Write)?;
    let layout = db.case_layout();
    for case in cases {
        write_case(writer, &layout, case).map_err(AdbError::Write)?;
    }
    writer.flush().map_err(AdbError::Write)
}

/// Path of the binary database for a base name.
#[must_use]
pub fn adb_path(base: &Path) -> PathBuf {
    let mut name = base.as_os_str().to_os_string();
    name.push(".adb");
    PathBuf::from(name)
}

/// Path of the case list for a base name.
#[must_use]
pub fn case_list_path(base: &Path) -> PathBuf {
    let mut name = base.as_os_str().to_os_string();
    name.push(".adb.cases");
    PathBuf::from(name)
}

/// Write `<base>.adb` and `<base>.adb.cases`.
///
/// `swap` writes the opposite of native byte order.
///
/// # Errors
///
/// [`AdbError::Unreadable`] if a file cannot be created, [`AdbError::Write`]
/// on stream failure.
pub fn save_adb<P: AsRef<Path>>(
    base: P,
    db: &LoadedAeroMesh,
    cases: &[SolutionCase],
    swap: bool,
) -> AdbResult<()> {
    let base = base.as_ref();
    let create = |path: PathBuf| {
        File::create(&path).map_err(|source| AdbError::Unreadable { path, source })
    };

    let mut writer = BinaryWriter::new(BufWriter::new(create(adb_path(base))?));
    writer.set_swap(swap);
    write_adb(&mut writer, db, cases)?;

    let entries: Vec<CaseListEntry> = cases
        .iter()
        .map(|c| CaseListEntry::new(c.mach, c.alpha, c.beta, c.comment.clone()))
        .collect();
    let list_path = case_list_path(base);
    let mut list = create(list_path.clone())?;
    list.write_all(format_case_list(&entries).as_bytes())
        .map_err(|source| AdbError::Unreadable {
            path: list_path,
            source,
        })?;

    info!(
        path = %base.display(),
        cases = cases.len(),
        swapped = swap,
        "Saved aerodynamic database"
    );
    Ok(())
}
