//! Shared geometry types for the aerodynamic mesh pipeline.
//!
//! This crate provides the small set of values every other `aero-*` crate
//! passes around:
//!
//! - [`Tri`] - A triangle referencing three nodes, tagged with surface ids
//! - [`TriMesh`] - Node list plus triangle list, as loaded from a solver file
//! - [`Aabb`] - Axis-aligned bounding box with tolerance-aware overlap
//! - [`Axis`] - One of the three coordinate axes
//!
//! # Indexing
//!
//! Node and triangle indices are **0-based** everywhere in memory. External
//! formats that count from 1 are converted at the reader/writer boundary.
//!
//! # Units
//!
//! Unit-agnostic. Coordinates are `f64`; binary `f32` fields widen on read
//! and narrow back on write without loss.
//!
//! # Example
//!
//! ```
//! use aero_types::{Point3, Tri, TriMesh};
//!
//! let mut mesh = TriMesh::new();
//! mesh.nodes.push(Point3::new(0.0, 0.0, 0.0));
//! mesh.nodes.push(Point3::new(1.0, 0.0, 0.0));
//! mesh.nodes.push(Point3::new(0.0, 1.0, 0.0));
//! mesh.tris.push(Tri::new([0, 1, 2]));
//!
//! assert_eq!(mesh.tri_count(), 1);
//! assert!((mesh.tri_area(0) - 0.5).abs() < 1e-12);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod axis;
mod bounds;
mod mesh;
mod tri;

pub use axis::Axis;
pub use bounds::Aabb;
pub use mesh::TriMesh;
pub use tri::Tri;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point3, Vector3};
