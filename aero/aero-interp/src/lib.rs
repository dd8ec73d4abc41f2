//! Load transfer between non-conforming triangle meshes.
//!
//! Carries per-triangle aerodynamic loads from a solver surface onto a
//! structural skin with an unrelated triangulation. Each destination
//! triangle is matched to a source triangle by normal agreement and
//! stencil containment, found through a k-d tree of source centroids.
//!
//! A destination element with no acceptable donor is never silently
//! zeroed: it is listed in [`Transfer::misses`] with a [`MissReason`], and
//! callers opt in to zero fill through [`Transfer::loads_or_zero`].
//!
//! # Vortex-lattice sources
//!
//! A vortex-lattice surface has zero thickness and carries a pressure
//! jump. Build the source with [`InterpMesh::with_lifting_surface_mirror`]
//! and use [`InterpParams::vortex_lattice`].
//!
//! # Example
//!
//! ```
//! use aero_interp::{InterpMesh, InterpParams, LoadSample, interpolate};
//! use aero_types::Point3;
//!
//! let nodes = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(2.0, 0.0, 0.0),
//!     Point3::new(0.0, 2.0, 0.0),
//! ];
//! let source = InterpMesh::new(nodes, vec![[0, 1, 2]])
//!     .with_loads(vec![LoadSample::cp(1.2)]);
//!
//! let skin = InterpMesh::new(
//!     vec![
//!         Point3::new(0.1, 0.1, 0.0),
//!         Point3::new(0.6, 0.1, 0.0),
//!         Point3::new(0.1, 0.6, 0.0),
//!     ],
//!     vec![[0, 1, 2]],
//! )
//! .with_element_ids(vec![4001]);
//!
//! let transfer = interpolate(&source, &skin, &InterpParams::default()).unwrap();
//! assert!(transfer.is_complete());
//! assert!((transfer.loads[0].unwrap().cp - 1.2).abs() < 1e-12);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod error;
mod geometry;
mod interpolate;
mod mesh;
mod params;
mod search;
mod transfer;

pub use error::{InterpError, InterpResult};
pub use interpolate::interpolate;
pub use mesh::{InterpMesh, LoadSample};
pub use params::{InterpParams, Symmetry};
pub use search::NEAREST_CANDIDATES;
pub use transfer::{
    Donor, DonorKind, InterpolationMiss, MissReason, Transfer, TransferReport,
};
