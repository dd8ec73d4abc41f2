//! Per-case solution blocks.

use std::io::{Read, Write};

use aero_codec::{BinaryReader, BinaryWriter, CodecResult};
use aero_types::{Point3, TriMesh, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{AdbResult, InSection, capacity, count};
use crate::format::ModelType;
use crate::mesh::CaseLayout;

/// Trailing wake polyline shed from a wing.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WakeLine {
    /// Wing id.
    pub wing_id: i32,
    /// Span station.
    pub span: f64,
    /// Polyline points.
    pub points: Vec<Point3<f64>>,
}

/// One solution case.
///
/// Vectors are sized by the [`CaseLayout`] of the mesh section: vortex-loop
/// arrays by loop count, `edge_forces` by surface vortex edge count, and
/// the `cp*`/`gamma` arrays by triangle count.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SolutionCase {
    /// Case number, 1-based.
    pub index: usize,
    /// Mach number.
    pub mach: f64,
    /// Angle of attack in degrees.
    pub alpha: f64,
    /// Sideslip angle in degrees.
    pub beta: f64,
    /// Solver minimum Cp.
    pub cp_min: f64,
    /// Solver maximum Cp.
    pub cp_max: f64,
    /// Free-text comment from the case list.
    pub comment: String,
    /// Circulation per vortex loop.
    pub loop_gamma: Vec<f64>,
    /// Unsteady pressure jump per vortex loop.
    pub loop_dcp_unsteady: Vec<f64>,
    /// Force per surface vortex edge.
    pub edge_forces: Vec<Vector3<f64>>,
    /// Induced velocity per vortex loop.
    pub loop_velocity: Vec<Vector3<f64>>,
    /// Steady Cp per triangle.
    pub cp: Vec<f64>,
    /// Unsteady Cp per triangle.
    pub cp_unsteady: Vec<f64>,
    /// Circulation per triangle.
    pub gamma: Vec<f64>,
    /// Trailing wakes.
    pub wakes: Vec<WakeLine>,
    /// Deflection per control surface.
    pub deflections: Vec<f64>,
}

impl SolutionCase {
    /// A zero-filled case sized for `layout`.
    #[must_use]
    pub fn zeroed(index: usize, layout: &CaseLayout) -> Self {
        Self {
            index,
            loop_gamma: vec![0.0; layout.vortex_loops],
            loop_dcp_unsteady: vec![0.0; layout.vortex_loops],
            edge_forces: vec![Vector3::zeros(); layout.vortex_edges],
            loop_velocity: vec![Vector3::zeros(); layout.vortex_loops],
            cp: vec![0.0; layout.tris],
            cp_unsteady: vec![0.0; layout.tris],
            gamma: vec![0.0; layout.tris],
            deflections: vec![0.0; layout.control_surfaces],
            ..Self::default()
        }
    }

    /// Area-weighted average of triangle Cp onto nodes.
    ///
    /// Nodes touched by no triangle of positive area get 0.
    #[must_use]
    pub fn nodal_cp(&self, mesh: &TriMesh) -> Vec<f64> {
        mesh.area_weighted_nodal(&self.cp)
    }

    /// Display range for Cp.
    ///
    /// Vortex-lattice results are clipped to one standard deviation around
    /// the mean, intersected with the actual extremes. Other models use the
    /// solver's own range.
    #[must_use]
    pub fn cp_range(&self, model: ModelType) -> (f64, f64) {
        if !model.is_vortex_lattice() || self.cp.is_empty() {
            return (self.cp_min, self.cp_max);
        }

        let (lo, hi) = self
            .cp
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &c| {
                (lo.min(c), hi.max(c))
            });
        #[allow(clippy::cast_precision_loss)]
        let n = self.cp.len() as f64;
        let mean = self.cp.iter().sum::<f64>() / n;
        let std_dev = (self.cp.iter().map(|c| (mean - c).powi(2)).sum::<f64>() / n).sqrt();

        ((mean - std_dev).max(lo), (mean + std_dev).min(hi))
    }
}

fn vec3(v: [f64; 3]) -> Vector3<f64> {
    Vector3::new(v[0], v[1], v[2])
}

/// Decode one case block.
pub(crate) fn read_case<R: Read>(
    reader: &mut BinaryReader<R>,
    layout: &CaseLayout,
    index: usize,
) -> AdbResult<SolutionCase> {
    const SECTION: &str = "solution case";

    let [mach, alpha, beta, cp_min, cp_max]: [f32; 5] =
        reader.read_array().in_section("case header")?;
    let mut case = SolutionCase {
        index,
        mach: f64::from(mach),
        alpha: f64::from(alpha).to_degrees(),
        beta: f64::from(beta).to_degrees(),
        cp_min: f64::from(cp_min),
        cp_max: f64::from(cp_max),
        ..SolutionCase::default()
    };

    let loops: Vec<f64> = reader
        .read_vec(layout.vortex_loops.saturating_mul(2))
        .in_section(SECTION)?;
    for pair in loops.chunks_exact(2) {
        case.loop_gamma.push(pair[0]);
        case.loop_dcp_unsteady.push(pair[1]);
    }

    let forces: Vec<f64> = reader
        .read_vec(layout.vortex_edges.saturating_mul(3))
        .in_section(SECTION)?;
    case.edge_forces = forces
        .chunks_exact(3)
        .map(|c| vec3([c[0], c[1], c[2]]))
        .collect();

    let velocity: Vec<f64> = reader
        .read_vec(layout.vortex_loops.saturating_mul(3))
        .in_section(SECTION)?;
    case.loop_velocity = velocity
        .chunks_exact(3)
        .map(|c| vec3([c[0], c[1], c[2]]))
        .collect();

    let tris: Vec<f32> = reader.read_vec(layout.tris.saturating_mul(3)).in_section(SECTION)?;
    for t in tris.chunks_exact(3) {
        case.cp.push(f64::from(t[0]));
        case.cp_unsteady.push(f64::from(t[1]));
        case.gamma.push(f64::from(t[2]));
    }

    let wakes: i32 = reader.read().in_section("wakes")?;
    let wakes = count("wake count", wakes)?;
    case.wakes.reserve(capacity(wakes));
    for _ in 0..wakes {
        let wing_id: i32 = reader.read().in_section("wakes")?;
        let span: f32 = reader.read().in_section("wakes")?;
        let points: i32 = reader.read().in_section("wakes")?;
        let raw: Vec<f32> = reader
            .read_vec(count("wake point count", points)?.saturating_mul(3))
            .in_section("wakes")?;
        case.wakes.push(WakeLine {
            wing_id,
            span: f64::from(span),
            points: raw
                .chunks_exact(3)
                .map(|c| Point3::new(f64::from(c[0]), f64::from(c[1]), f64::from(c[2])))
                .collect(),
        });
    }

    let deflections: Vec<f32> = reader
        .read_vec(layout.control_surfaces)
        .in_section("control deflections")?;
    case.deflections = deflections.into_iter().map(f64::from).collect();

    Ok(case)
}

/// Skip one case block without keeping its arrays.
pub(crate) fn skip_case<R: Read>(
    reader: &mut BinaryReader<R>,
    layout: &CaseLayout,
) -> AdbResult<()> {
    read_case(reader, layout, 0).map(drop)
}

#[allow(clippy::cast_possible_truncation)]
fn narrow(v: f64) -> f32 {
    v as f32
}

/// Encode one case block.
///
/// Arrays shorter than the layout are zero-padded and longer ones are
/// truncated, so the block size always matches the mesh section.
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
pub(crate) fn write_case<W: Write>(
    writer: &mut BinaryWriter<W>,
    layout: &CaseLayout,
    case: &SolutionCase,
) -> CodecResult<()> {
    writer.write_all(&[
        narrow(case.mach),
        narrow(case.alpha.to_radians()),
        narrow(case.beta.to_radians()),
        narrow(case.cp_min),
        narrow(case.cp_max),
    ])?;

    let at = |v: &[f64], i: usize| v.get(i).copied().unwrap_or(0.0);
    let at3 = |v: &[Vector3<f64>], i: usize| v.get(i).copied().unwrap_or_else(Vector3::zeros);

    for i in 0..layout.vortex_loops {
        writer.write_all(&[at(&case.loop_gamma, i), at(&case.loop_dcp_unsteady, i)])?;
    }
    for i in 0..layout.vortex_edges {
        let f = at3(&case.edge_forces, i);
        writer.write_all(&[f.x, f.y, f.z])?;
    }
    for i in 0..layout.vortex_loops {
        let v = at3(&case.loop_velocity, i);
        writer.write_all(&[v.x, v.y, v.z])?;
    }
    for i in 0..layout.tris {
        writer.write_all(&[
            narrow(at(&case.cp, i)),
            narrow(at(&case.cp_unsteady, i)),
            narrow(at(&case.gamma, i)),
        ])?;
    }

    writer.write(case.wakes.len() as i32)?;
    for wake in &case.wakes {
        writer.write(wake.wing_id)?;
        writer.write(narrow(wake.span))?;
        writer.write(wake.points.len() as i32)?;
        for p in &wake.points {
            writer.write_all(&[narrow(p.x), narrow(p.y), narrow(p.z)])?;
        }
    }

    for i in 0..layout.control_surfaces {
        writer.write(narrow(at(&case.deflections, i)))?;
    }
    Ok(())
}
