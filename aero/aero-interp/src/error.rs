//! Error types for load interpolation.

use thiserror::Error;

/// Result type for interpolation.
pub type InterpResult<T> = Result<T, InterpError>;

/// Errors that stop an interpolation run.
///
/// Destination elements that merely find no acceptable donor are not
/// errors; they are reported as [`InterpolationMiss`](crate::InterpolationMiss).
#[derive(Debug, Error)]
pub enum InterpError {
    /// A triangle references a node that does not exist.
    #[error("triangle {tri} references missing node {node}")]
    InvalidNode {
        /// Triangle index.
        tri: usize,
        /// Offending node index.
        node: u32,
    },

    /// Element ids or loads do not have one entry per triangle.
    #[error("{what} has {found} entries for {tris} triangles")]
    LengthMismatch {
        /// Which per-triangle array.
        what: &'static str,
        /// Triangle count.
        tris: usize,
        /// Entries supplied.
        found: usize,
    },

    /// The source mesh carries no loads to transfer.
    #[error("source mesh has no loads")]
    MissingLoads,

    /// No source triangle was usable even with normal checks relaxed.
    #[error("no donor found for destination element {element}")]
    NoDonor {
        /// Destination element id.
        element: u32,
    },
}
