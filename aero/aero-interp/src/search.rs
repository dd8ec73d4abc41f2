//! Candidate donor search over source centroids.

use aero_types::Point3;
use kiddo::{KdTree, SquaredEuclidean};

/// Nearest source centroids always considered, on top of the radius query.
pub const NEAREST_CANDIDATES: usize = 8;

/// Relative size of the per-point offset applied inside the tree.
const JITTER: f64 = 1.0e-9;

/// k-d tree of source triangle centroids.
pub(crate) struct CandidateIndex {
    tree: KdTree<f64, 3>,
    radius_sq: f64,
}

impl CandidateIndex {
    /// Index `centroids`, answering radius queries of `radius`.
    ///
    /// Flat lifting surfaces put every centroid at the same coordinate on
    /// one axis, which a bucketed k-d tree cannot split. Each point is
    /// offset by a distinct amount far below `scale` before insertion, and
    /// the radius is padded to cover it.
    pub fn new(centroids: &[Point3<f64>], radius: f64, scale: f64) -> Self {
        let spread = JITTER * scale.max(1.0);
        #[allow(clippy::cast_precision_loss)]
        let n = centroids.len().max(1) as f64;

        let mut tree: KdTree<f64, 3> = KdTree::new();
        for (i, c) in centroids.iter().enumerate() {
            #[allow(clippy::cast_precision_loss)]
            let d = spread * (i as f64 / n);
            tree.add(&[c.x + d, c.y - d, c.z + d], i as u64);
        }

        let padded = radius + 2.0 * spread;
        Self {
            tree,
            radius_sq: padded * padded,
        }
    }

    /// Source triangles near `point`, sorted and deduplicated.
    pub fn candidates(&self, point: &Point3<f64>) -> Vec<u32> {
        let query = [point.x, point.y, point.z];
        let mut found: Vec<u32> = self
            .tree
            .within_unsorted::<SquaredEuclidean>(&query, self.radius_sq)
            .into_iter()
            .chain(
                self.tree
                    .nearest_n::<SquaredEuclidean>(&query, NEAREST_CANDIDATES),
            )
            .filter_map(|nn| u32::try_from(nn.item).ok())
            .collect();
        found.sort_unstable();
        found.dedup();
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coplanar_points_index_without_trouble() {
        // A few hundred centroids sharing z = 0 and repeated x values.
        let centroids: Vec<Point3<f64>> = (0..400)
            .map(|i| Point3::new(f64::from(i % 4), f64::from(i / 4), 0.0))
            .collect();
        let index = CandidateIndex::new(&centroids, 0.5, 100.0);
        let near = index.candidates(&Point3::new(1.0, 10.0, 0.0));
        assert!(near.contains(&41));
        assert!(near.len() >= NEAREST_CANDIDATES);
    }

    #[test]
    fn radius_and_nearest_are_merged() {
        let centroids = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(100.0, 0.0, 0.0),
        ];
        let index = CandidateIndex::new(&centroids, 1.0, 100.0);
        // Only one point in radius, both via nearest-n.
        assert_eq!(index.candidates(&Point3::new(0.1, 0.0, 0.0)), vec![0, 1]);
    }
}
