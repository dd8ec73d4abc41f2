//! Structural deck rewriting and shell thickness sizing.
//!
//! Reads CalculiX-style `.inp` decks into typed [`Section`]s and writes
//! them back with the same keyword grammar. On top of the deck model:
//!
//! - [`Deck::surface_mesh`] exposes the skin as an interpolation target
//! - [`analysis_deck`] adds symmetry clamps and a static or buckling step
//!   carrying interpolated pressures
//! - [`merge_decks`] and [`renumber`] combine components into one model
//!   with dense ids
//! - [`FrdResults`] reads solver results and [`optimize`] resizes the
//!   shell thickness from element stresses
//!
//! # Example
//!
//! ```
//! use aero_fea::{AnalysisParams, Deck, analysis_deck, renumber};
//!
//! let deck = Deck::parse(
//!     "*NODE\n10, 0, 0, 0\n20, 1, 0.5, 0\n30, 0, 1, 0\n\
//!      *ELEMENT, TYPE=S3, ELSET=ESkin\n7, 10, 20, 30\n",
//! )
//! .unwrap();
//! let (dense, map) = renumber(&deck);
//! assert_eq!(map.node(30), Some(3));
//!
//! let out = analysis_deck(&dense, &[(1, 0.4)], &AnalysisParams::static_step());
//! let text = out.to_inp_string();
//! assert!(text.contains("*BOUNDARY\n1, 1, 6\n"));
//! assert!(text.contains("1, P1, -0.4"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod analysis;
mod deck;
mod edit;
mod error;
mod frd;
mod ids;
mod keyword;
mod merge;
mod optimize;
mod parse;
mod sizing;
mod stress;
mod surface;
mod write;

pub use analysis::{
    ALL_NODES, ALL_NODES_END, AnalysisKind, AnalysisParams, all_nodes_set, analysis_deck,
    write_analysis_deck,
};
pub use deck::{
    BoundaryCondition, Card, Cload, Deck, Dload, Equation, EquationTerm, FeaElement, FeaNode,
    IdRef, Material, RawCard, Section, SetEntry, SetKind, ShellSection, Step,
};
pub use error::{FeaError, FeaResult};
pub use frd::{ElementGeometry, FrdElement, FrdElementType, FrdResults};
pub use ids::{IdOffsets, OFFSET_MARGIN, OFFSET_ROUNDING, Renumbering, renumber};
pub use keyword::{Keyword, Param};
pub use merge::{MergeParams, merge_decks};
pub use optimize::{Optimization, SizedElement, SizingReport, format_sized, optimize};
pub use sizing::{Binning, SizingParams, SizingRule, size_thickness, smooth_thickness};
pub use stress::{principal_stresses, stress_magnitude};
pub use surface::DEFAULT_SKIN_ELSET;
