//! Donor search and load transfer.

use aero_types::{Point3, Vector3};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::error::{InterpError, InterpResult};
use crate::geometry::{MeshGeometry, nodal_loads};
use crate::mesh::{InterpMesh, LoadSample};
use crate::params::{InterpParams, Symmetry};
use crate::search::CandidateIndex;
use crate::transfer::{Donor, DonorKind, InterpolationMiss, MissReason, Transfer, TransferReport};

/// Stencil ratio limits for points just outside a donor.
const MAX_AREA_RATIO: f64 = 2.0;
const MAX_EXCESS_RATIO: f64 = 4.0;

/// Distance acceptance factors against `sqrt(donor area)`.
const CONTAINED_REACH: f64 = 3.0;
const NEAREST_REACH: f64 = 2.0;

/// Relative distance below which two contained candidates tie.
const TIE_SLACK: f64 = 1.0e-12;

/// A destination triangle, reflected if needed.
struct Query {
    point: Point3<f64>,
    normal: Vector3<f64>,
    area: f64,
}

struct Candidate {
    donor: Donor,
    value: LoadSample,
    donor_area: f64,
    /// All sub-areas share a sign.
    inside: bool,
    /// Sum of absolute sub-areas over the donor area.
    area_ratio: f64,
    /// Half the absolute difference between those two areas.
    excess: f64,
}

impl Candidate {
    /// Inside the donor, or close enough outside it to extrapolate.
    fn inside_stencil(&self, query_area: f64) -> bool {
        self.inside
            || (self.area_ratio < MAX_AREA_RATIO && self.excess / query_area < MAX_EXCESS_RATIO)
    }

    /// Closer projection wins; on a tie a strictly containing donor wins.
    fn beats(&self, best: &Self) -> bool {
        let d = self.donor.distance_sq;
        let b = best.donor.distance_sq;
        let slack = TIE_SLACK * self.donor_area.max(best.donor_area);
        if (d - b).abs() <= slack && self.inside != best.inside {
            return self.inside;
        }
        d <= b
    }
}

enum Outcome {
    Hit {
        donor: Donor,
        value: LoadSample,
        relaxed: bool,
    },
    Miss {
        reason: MissReason,
        donor: Option<Donor>,
        relaxed: bool,
    },
}

impl Outcome {
    const fn miss(reason: MissReason) -> Self {
        Self::Miss {
            reason,
            donor: None,
            relaxed: false,
        }
    }
}

/// Prepared source mesh.
struct Source<'a> {
    mesh: &'a InterpMesh,
    geometry: MeshGeometry,
    nodal: Vec<LoadSample>,
    index: CandidateIndex,
    tolerance: Vector3<f64>,
}

impl Source<'_> {
    /// Score every candidate and keep the best contained one, or failing
    /// that the one with the nearest centroid.
    fn best_donor(
        &self,
        query: &Query,
        candidates: &[u32],
        ignore_normals: bool,
        params: &InterpParams,
    ) -> Option<Candidate> {
        let mut contained: Option<Candidate> = None;
        let mut nearest: Option<Candidate> = None;

        for &t in candidates {
            let ti = t as usize;
            let area = self.geometry.areas[ti];
            if area <= 0.0 {
                continue;
            }
            let normal = self.geometry.normals[ti];
            if !ignore_normals {
                let dot = normal.dot(&query.normal);
                let angle = dot.clamp(-1.0, 1.0).acos().to_degrees();
                if !(dot > 0.0 && angle <= params.max_normal_angle_deg) {
                    continue;
                }
            }

            let Some(candidate) = self.evaluate(t, query, &normal, area) else {
                continue;
            };

            if candidate.inside_stencil(query.area) {
                let better = contained.as_ref().is_none_or(|best| candidate.beats(best));
                if better {
                    contained = Some(candidate);
                }
            } else if contained.is_none() {
                let dist = (self.geometry.centroids[ti] - query.point).norm_squared();
                let better = nearest.as_ref().is_none_or(|best| dist <= best.donor.distance_sq);
                if better {
                    let mut c = candidate;
                    c.donor.kind = DonorKind::Nearest;
                    c.donor.distance_sq = dist;
                    nearest = Some(c);
                }
            }
        }
        contained.or(nearest)
    }

    /// Barycentric projection of the query onto source triangle `t`.
    fn evaluate(
        &self,
        t: u32,
        query: &Query,
        normal: &Vector3<f64>,
        area: f64,
    ) -> Option<Candidate> {
        let ti = t as usize;
        let nodes = self.mesh.tris[ti];
        let [p0, p1, p2] = self.mesh.corners(ti);
        let x = query.point;

        // Signed sub-areas opposite each corner, against the donor normal.
        let sub = [
            (p2 - p1).cross(&(x - p1)).dot(normal),
            (p0 - p2).cross(&(x - p2)).dot(normal),
            (p1 - p0).cross(&(x - p0)).dot(normal),
        ];
        let full = (p1 - p0).cross(&(p2 - p0)).dot(normal).abs();
        let total: f64 = sub.iter().sum();
        if total == 0.0 || !total.is_finite() || full == 0.0 {
            return None;
        }
        let weights = sub.map(|a| a / total);

        let projected = Point3::from(
            p0.coords * weights[0] + p1.coords * weights[1] + p2.coords * weights[2],
        );
        let corner_values = nodes.map(|n| self.nodal[n as usize]);
        let value = (corner_values[0] * weights[0]
            + corner_values[1] * weights[1]
            + corner_values[2] * weights[2])
            .clamp_to(&corner_values);

        let positive = sub.iter().filter(|&&a| a >= 0.0).count();
        let abs_sum: f64 = sub.iter().map(|a| a.abs()).sum();

        Some(Candidate {
            donor: Donor {
                tri: t,
                nodes,
                weights,
                kind: DonorKind::Contained,
                distance_sq: (x - projected).norm_squared(),
            },
            value,
            donor_area: area,
            inside: positive == 0 || positive == 3,
            area_ratio: abs_sum / full,
            excess: 0.5 * (abs_sum - full).abs(),
        })
    }

    fn transfer_one(
        &self,
        index: usize,
        element: u32,
        target: &MeshGeometry,
        params: &InterpParams,
    ) -> InterpResult<Outcome> {
        let mut query = Query {
            point: target.centroids[index],
            normal: target.normals[index],
            area: target.areas[index],
        };

        let reflect = match params.symmetry {
            Symmetry::Off => false,
            Symmetry::PositiveY => query.point.y < 0.0,
            Symmetry::NegativeY => query.point.y > 0.0,
        };
        if reflect {
            query.point.y = -query.point.y;
            query.normal.y = -query.normal.y;
        }

        if !params.ignore_bounding_box
            && !self.geometry.bounds.contains_within(&query.point, &self.tolerance)
        {
            return Ok(Outcome::miss(MissReason::OutsideBounds));
        }

        let candidates = self.index.candidates(&query.point);
        let mut relaxed = false;
        let found = match self.best_donor(&query, &candidates, false, params) {
            Some(c) => c,
            None if params.strict => return Ok(Outcome::miss(MissReason::NoContainment)),
            None => {
                relaxed = true;
                self.best_donor(&query, &candidates, true, params)
                    .ok_or(InterpError::NoDonor { element })?
            }
        };

        let donor = found.donor;
        let reason = if params.strict && donor.kind == DonorKind::Nearest {
            Some(MissReason::NoContainment)
        } else if params.symmetry != Symmetry::Off && self.across_symmetry(&donor, &query) {
            Some(MissReason::WrongSide)
        } else if self.too_far(&donor, found.donor_area) {
            Some(MissReason::TooFar)
        } else {
            None
        };

        Ok(match reason {
            Some(reason) => Outcome::Miss {
                reason,
                donor: Some(donor),
                relaxed,
            },
            None => Outcome::Hit {
                donor,
                value: found.value,
                relaxed,
            },
        })
    }

    fn across_symmetry(&self, donor: &Donor, query: &Query) -> bool {
        let mean_y = donor
            .nodes
            .iter()
            .map(|&n| self.mesh.nodes[n as usize].y)
            .sum::<f64>()
            / 3.0;
        query.point.y * mean_y < 0.0 && mean_y.abs() > self.tolerance.y
    }

    fn too_far(&self, donor: &Donor, donor_area: f64) -> bool {
        let reach = match donor.kind {
            DonorKind::Contained => CONTAINED_REACH,
            DonorKind::Nearest => NEAREST_REACH,
        };
        donor.distance_sq > reach * donor_area.sqrt()
    }
}

/// Transfer the per-triangle loads of `source` onto `dest`.
///
/// Source loads are first averaged onto source nodes by area. Each
/// destination centroid then looks for a source triangle whose normal
/// agrees with its own and whose stencil contains it, and takes the
/// barycentric blend of that triangle's nodal values, limited to their
/// range. Without a containing triangle the one with the nearest centroid
/// is used, unless `params.strict` is set.
///
/// Destination triangles are processed in parallel; the result does not
/// depend on scheduling.
///
/// # Errors
///
/// - [`InterpError::MissingLoads`] if `source` has no loads
/// - [`InterpError::InvalidNode`] / [`InterpError::LengthMismatch`] for
///   inconsistent meshes
/// - [`InterpError::NoDonor`] if, outside strict mode, a destination
///   element finds no candidate even with normal checks relaxed
///
/// # Example
///
/// ```
/// use aero_interp::{InterpMesh, InterpParams, LoadSample, interpolate};
/// use aero_types::Point3;
///
/// let nodes = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(1.0, 1.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// ];
/// let tris = vec![[0, 1, 2], [0, 2, 3]];
/// let source = InterpMesh::new(nodes.clone(), tris.clone())
///     .with_loads(vec![LoadSample::cp(-0.5); 2]);
/// let dest = InterpMesh::new(nodes, tris);
///
/// let transfer = interpolate(&source, &dest, &InterpParams::default()).unwrap();
/// assert!(transfer.is_complete());
/// assert!((transfer.loads_or_zero()[1].cp + 0.5).abs() < 1e-12);
/// ```
pub fn interpolate(
    source: &InterpMesh,
    dest: &InterpMesh,
    params: &InterpParams,
) -> InterpResult<Transfer> {
    source.validate()?;
    dest.validate()?;
    let loads = source.loads.as_deref().ok_or(InterpError::MissingLoads)?;

    let mut geometry = MeshGeometry::new(source);
    if params.swap_normals {
        geometry.flip_normals();
    }
    let nodal = nodal_loads(source, &geometry.areas, loads);

    let tolerance = if geometry.bounds.is_empty() {
        Vector3::zeros()
    } else {
        geometry.bounds.size().abs() * 0.01
    };
    let search_tolerance = 2.0 * tolerance.max();
    let radius = geometry.reach(source) + search_tolerance;
    let index = CandidateIndex::new(&geometry.centroids, radius, geometry.bounds.diagonal());
    debug!(
        source_tris = source.tri_count(),
        radius,
        search_tolerance,
        "Built donor index"
    );

    let src = Source {
        mesh: source,
        geometry,
        nodal,
        index,
        tolerance,
    };
    let target = MeshGeometry::new(dest);

    let outcomes = (0..dest.tri_count())
        .into_par_iter()
        .map(|i| src.transfer_one(i, dest.element_ids[i], &target, params))
        .collect::<InterpResult<Vec<_>>>()?;

    let transfer = collect(outcomes, &dest.element_ids);
    let report = &transfer.report;
    if report.normals_relaxed > 0 {
        warn!(
            count = report.normals_relaxed,
            "Relaxed normal constraint to find donors"
        );
    }
    if report.misses > 0 {
        warn!(misses = report.misses, "Destination elements without a load");
    }
    info!(
        destination_tris = report.destination_tris,
        contained = report.contained,
        nearest = report.nearest,
        misses = report.misses,
        "Interpolated loads"
    );
    Ok(transfer)
}

fn collect(outcomes: Vec<Outcome>, element_ids: &[u32]) -> Transfer {
    let mut transfer = Transfer {
        loads: Vec::with_capacity(outcomes.len()),
        donors: Vec::with_capacity(outcomes.len()),
        misses: Vec::new(),
        report: TransferReport {
            destination_tris: outcomes.len(),
            ..TransferReport::default()
        },
    };

    for (index, outcome) in outcomes.into_iter().enumerate() {
        match outcome {
            Outcome::Hit {
                donor,
                value,
                relaxed,
            } => {
                transfer.report.interpolated += 1;
                match donor.kind {
                    DonorKind::Contained => transfer.report.contained += 1,
                    DonorKind::Nearest => transfer.report.nearest += 1,
                }
                transfer.report.normals_relaxed += usize::from(relaxed);
                transfer.loads.push(Some(value));
                transfer.donors.push(Some(donor));
            }
            Outcome::Miss {
                reason,
                donor,
                relaxed,
            } => {
                transfer.report.normals_relaxed += usize::from(relaxed);
                transfer.loads.push(None);
                transfer.donors.push(donor);
                transfer.misses.push(InterpolationMiss {
                    index,
                    element: element_ids[index],
                    reason,
                });
            }
        }
    }
    transfer.report.misses = transfer.misses.len();
    transfer
}
