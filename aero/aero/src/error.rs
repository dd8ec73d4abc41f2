//! Error type for the file-level pipeline.

use std::path::PathBuf;

use aero_adb::AdbError;
use aero_fea::FeaError;
use aero_interp::InterpError;
use aero_slice::SliceError;
use thiserror::Error;

/// Result type for pipeline operations.
pub type AeroResult<T> = Result<T, AeroError>;

/// Any failure of a pipeline stage.
#[derive(Debug, Error)]
pub enum AeroError {
    /// Database loading or writing failed.
    #[error(transparent)]
    Adb(#[from] AdbError),

    /// Cuts file or slicing failed.
    #[error(transparent)]
    Slice(#[from] SliceError),

    /// Load transfer failed.
    #[error(transparent)]
    Interp(#[from] InterpError),

    /// Deck or results processing failed.
    #[error(transparent)]
    Fea(#[from] FeaError),

    /// An output file could not be created or written.
    #[error("cannot write {path}: {source}")]
    Write {
        /// Output path.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: std::io::Error,
    },
}
