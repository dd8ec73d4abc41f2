//! Error types for slicing.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for slicing operations.
pub type SliceResult<T> = Result<T, SliceError>;

/// Errors raised while reading cut definitions or slicing.
#[derive(Debug, Error)]
pub enum SliceError {
    /// The cuts file does not exist.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path that was not found.
        path: PathBuf,
    },

    /// The file exists but could not be read.
    #[error("cannot read {path}: {source}")]
    Unreadable {
        /// Path being read.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: std::io::Error,
    },

    /// The cuts file is not `<count>` followed by `<axis> <value>` pairs.
    #[error("malformed cuts file: {reason}")]
    MalformedCuts {
        /// What was wrong.
        reason: String,
    },

    /// The scalar field does not have one value per node.
    #[error("scalar field has {values} values for {nodes} nodes")]
    ScalarLengthMismatch {
        /// Node count.
        nodes: usize,
        /// Scalar count.
        values: usize,
    },

    /// An edge references a node that does not exist.
    #[error("edge {edge} references missing node {node}")]
    InvalidEdge {
        /// Edge index.
        edge: usize,
        /// Offending node index.
        node: u32,
    },

    /// Failure writing slice output.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SliceError {
    /// Create a `MalformedCuts` error with the given reason.
    #[must_use]
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedCuts {
            reason: reason.into(),
        }
    }
}
