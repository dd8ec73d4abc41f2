//! Axis-aligned cutting-plane slices of surface solutions.
//!
//! Each plane is stood in for by a large quad. Every mesh edge whose bounding
//! box touches the quad's is tested against the quad's two triangles, and a
//! crossing yields one point with a linearly interpolated scalar.
//!
//! - [`slice_planes`] / [`slice_mesh`] - compute [`SliceBlock`]s
//! - [`parse_cuts`] / [`load_cuts`] - read the `.cuts` plane list
//! - [`write_slice_blocks`] - emit the `.slc` text blocks for one case
//!
//! # Example
//!
//! ```
//! use aero_slice::{CuttingPlane, SliceParams, slice_mesh};
//! use aero_types::{Point3, TriMesh};
//!
//! let mesh = TriMesh::from_parts(
//!     vec![
//!         Point3::new(0.0, 0.0, 0.0),
//!         Point3::new(1.0, 0.0, 0.0),
//!         Point3::new(1.0, 1.0, 0.0),
//!         Point3::new(0.0, 1.0, 0.0),
//!     ],
//!     &[[0, 1, 2], [0, 2, 3]],
//! );
//! let cp = [1.0, -1.0, -1.0, 1.0];
//!
//! let blocks = slice_mesh(&mesh, &cp, &[CuttingPlane::x(0.5)], &SliceParams::default()).unwrap();
//! assert!(blocks[0].points.iter().all(|p| p.value.abs() < 1e-9));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod cuts;
mod error;
mod intersect;
mod output;
mod params;
mod plane;
mod slicer;

pub use cuts::{format_cuts, load_cuts, parse_cuts};
pub use error::{SliceError, SliceResult};
pub use intersect::{SegmentEnd, SegmentHit, segment_triangle_intersection};
pub use output::{CaseLabel, ScalarKind, write_slice_blocks};
pub use params::SliceParams;
pub use plane::{CuttingPlane, DEFAULT_EXTENT};
pub use slicer::{SliceBlock, SlicePoint, slice_mesh, slice_planes};
