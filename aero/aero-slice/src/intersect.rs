//! Segment-triangle intersection with relative tolerances.

use aero_types::Point3;

/// Base tolerance on the parametric coordinates, scaled per parameter by
/// the ratio of the shortest to that parameter's own length.
const PARAM_TOLERANCE: f64 = 0.001;

/// Which endpoint of the segment lies below the triangle plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentEnd {
    /// The segment's first endpoint.
    Start,
    /// The segment's second endpoint.
    End,
}

/// A segment crossing a triangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentHit {
    /// Position along the segment, 0 at the start and 1 at the end. May
    /// lie slightly outside `[0, 1]` within tolerance.
    pub t: f64,
    /// Coordinate along the triangle's first edge.
    pub u: f64,
    /// Coordinate along the triangle's second edge.
    pub w: f64,
    /// Endpoint on the back side of the triangle normal.
    pub below: SegmentEnd,
}

/// Intersect the segment `a -> b` with the triangle `(p1, p2, p3)`.
///
/// Solves `p1 + u(p2-p1) + w(p3-p1) = a + t(b-a)`. Each of `t`, `u` and `w`
/// gets its own tolerance band, widened for short edges relative to the
/// longest of the three vectors, so near-misses on shared edges and
/// vertices still count. A segment parallel to the triangle never hits.
///
/// # Example
///
/// ```
/// use aero_slice::segment_triangle_intersection;
/// use aero_types::Point3;
///
/// let hit = segment_triangle_intersection(
///     [
///         Point3::new(0.0, 0.0, 0.0),
///         Point3::new(1.0, 0.0, 0.0),
///         Point3::new(0.0, 1.0, 0.0),
///     ],
///     Point3::new(0.25, 0.25, -1.0),
///     Point3::new(0.25, 0.25, 1.0),
/// )
/// .unwrap();
/// assert!((hit.t - 0.5).abs() < 1e-12);
/// ```
#[must_use]
#[allow(clippy::similar_names)]
pub fn segment_triangle_intersection(
    tri: [Point3<f64>; 3],
    a: Point3<f64>,
    b: Point3<f64>,
) -> Option<SegmentHit> {
    let [p1, p2, p3] = tri;
    let udir = p2 - p1;
    let wdir = p3 - p1;
    let tdir = b - a;

    let (u_len, w_len, t_len) = (udir.norm(), wdir.norm(), tdir.norm());
    let min_len = u_len.min(w_len).min(t_len);
    let max_len = u_len.max(w_len).max(t_len);
    if min_len <= 0.0 {
        return None;
    }

    // Lower bounds are negative; upper bounds slightly above 1.
    let band = |len: f64| -PARAM_TOLERANCE * (max_len / len) * (min_len / max_len);
    let (t_zero, u_zero, w_zero) = (band(t_len), band(u_len), band(w_len));
    let (t_one, u_one, w_one) = (1.0 - t_zero, 1.0 - u_zero, 1.0 - w_zero);

    let normal = udir.cross(&wdir);
    let det1 = normal.dot(&tdir);
    if det1 == 0.0 {
        return None;
    }
    let t = (normal.dot(&p1.coords) - normal.dot(&a.coords)) / det1;
    if !(t_zero..=t_one).contains(&t) {
        return None;
    }

    let cross = wdir.cross(&tdir);
    let det2 = cross.dot(&udir);
    if det2 == 0.0 {
        return None;
    }
    let u = (cross.dot(&a.coords) - cross.dot(&p1.coords)) / det2;
    if !(u_zero..=u_one).contains(&u) {
        return None;
    }

    let cross = udir.cross(&tdir);
    let det3 = cross.dot(&wdir);
    if det3 == 0.0 {
        return None;
    }
    let w = (cross.dot(&a.coords) - cross.dot(&p1.coords)) / det3;
    if !(w_zero..=w_one).contains(&w) || u + w > u_one.max(w_one) {
        return None;
    }

    let below = if normal.dot(&tdir) >= 0.0 {
        SegmentEnd::Start
    } else {
        SegmentEnd::End
    };
    Some(SegmentHit { t, u, w, below })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_tri() -> [Point3<f64>; 3] {
        [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn crossing_reports_parameters() {
        let hit = segment_triangle_intersection(
            unit_tri(),
            Point3::new(0.2, 0.3, 2.0),
            Point3::new(0.2, 0.3, -2.0),
        )
        .unwrap();
        assert_relative_eq!(hit.t, 0.5);
        assert_relative_eq!(hit.u, 0.2);
        assert_relative_eq!(hit.w, 0.3);
        assert_eq!(hit.below, SegmentEnd::End);
    }

    #[test]
    fn outside_triangle_misses() {
        assert!(
            segment_triangle_intersection(
                unit_tri(),
                Point3::new(0.8, 0.8, -1.0),
                Point3::new(0.8, 0.8, 1.0),
            )
            .is_none()
        );
    }

    #[test]
    fn segment_short_of_plane_misses() {
        assert!(
            segment_triangle_intersection(
                unit_tri(),
                Point3::new(0.2, 0.2, 1.0),
                Point3::new(0.2, 0.2, 0.5),
            )
            .is_none()
        );
    }

    #[test]
    fn parallel_segment_misses() {
        assert!(
            segment_triangle_intersection(
                unit_tri(),
                Point3::new(0.1, 0.1, 0.0),
                Point3::new(0.3, 0.1, 0.0),
            )
            .is_none()
        );
    }

    #[test]
    fn endpoint_on_plane_within_tolerance() {
        let hit = segment_triangle_intersection(
            unit_tri(),
            Point3::new(0.2, 0.2, 0.0),
            Point3::new(0.2, 0.2, 1.0),
        )
        .unwrap();
        assert_relative_eq!(hit.t, 0.0);
    }

    #[test]
    fn zero_length_segment_misses() {
        let p = Point3::new(0.2, 0.2, 0.0);
        assert!(segment_triangle_intersection(unit_tri(), p, p).is_none());
    }
}
