//! Edge topology reconstruction for triangle soups.
//!
//! Solver meshes arrive as a flat list of triangles. This crate recovers
//! the unique undirected edges, which triangles share each edge, and the
//! direction each triangle walks its edges in.
//!
//! - [`build_topology`] - single-pass hash-map build, edges in encounter order
//! - [`build_topology_sorted`] - parallel sort-and-group build
//! - [`TopologyDiagnostics`] - open, overloaded and degenerate findings
//!
//! Defects never abort the build. Zero-thickness lifting surfaces are open
//! by nature, so open edges are reported at `info` level and only
//! overloaded edges or degenerate triangles raise a warning.
//!
//! # Example
//!
//! ```
//! use aero_topology::build_topology;
//!
//! // Two triangles sharing the edge (0, 2)
//! let topo = build_topology(&[[0, 1, 2], [0, 2, 3]]);
//!
//! assert_eq!(topo.edge_count(), 5);
//! let shared = topo.find_edge(2, 0).unwrap();
//! assert_eq!(topo.edge(shared).tris, [Some(0), Some(1)]);
//! assert!(!topo.diagnostics().is_closed_manifold());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod diagnostics;
mod edge;
mod topology;

pub use diagnostics::TopologyDiagnostics;
pub use edge::{Edge, EdgeRef, normalize_edge};
pub use topology::{EdgeTopology, build_topology, build_topology_sorted};
