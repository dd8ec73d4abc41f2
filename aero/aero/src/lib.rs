//! Post-processing toolkit for vortex-lattice and panel aerodynamic solutions.
//!
//! This umbrella crate re-exports the `aero-*` crates and adds
//! [`pipeline`], which runs each stage over files named by a common base:
//!
//! - [`adb`] reads and writes the binary solution database
//! - [`topology`] rebuilds edges of the triangle soup
//! - [`slice`] cuts the surface with axis-aligned planes
//! - [`interp`] carries loads onto a structural skin
//! - [`fea`] rewrites structural decks and sizes shell thickness
//!
//! # Quick Start
//!
//! ```no_run
//! use aero::pipeline::{TransferParams, interpolate_to_deck, slice_database};
//! use aero::slice::SliceParams;
//!
//! // wing.adb + wing.cuts -> wing.slc
//! let summary = slice_database("wing", &SliceParams::default()).unwrap();
//! println!("{} cases sliced", summary.cases);
//!
//! // wing.adb + skin.inp -> skin.static.inp, skin.buckle.inp
//! let transfer = interpolate_to_deck("wing", "skin", &TransferParams::default()).unwrap();
//! assert!(transfer.is_complete());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod error;
pub mod pipeline;

pub use error::{AeroError, AeroResult};

// =============================================================================
// Re-exports
// =============================================================================

/// Shared geometry: `TriMesh`, `Tri`, `Aabb`, `Axis`.
pub use aero_types as types;

/// Fixed-width binary records in either byte order.
pub use aero_codec as codec;

/// The solution database and its case list.
pub use aero_adb as adb;

/// Edge topology and manifold diagnostics.
pub use aero_topology as topology;

/// Cutting-plane slices and the `.slc` format.
pub use aero_slice as slice;

/// Mesh-to-mesh load transfer.
pub use aero_interp as interp;

/// Structural deck rewriting and thickness sizing.
pub use aero_fea as fea;

// =============================================================================
// Prelude
// =============================================================================

/// Common imports.
///
/// ```
/// use aero::prelude::*;
/// ```
pub mod prelude {
    pub use aero_adb::{AdbFile, LoadedAeroMesh, SolutionCase};
    pub use aero_fea::{AnalysisParams, Deck, FrdResults, MergeParams, SizingParams};
    pub use aero_interp::{InterpMesh, InterpParams, Transfer};
    pub use aero_slice::{CuttingPlane, SliceParams};
    pub use aero_topology::build_topology;
    pub use aero_types::{Point3, TriMesh, Vector3};

    pub use crate::pipeline::TransferParams;
    pub use crate::{AeroError, AeroResult};
}
