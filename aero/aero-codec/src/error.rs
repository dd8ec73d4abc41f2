//! Error types for the binary codec.

use thiserror::Error;

/// Errors raised by [`BinaryReader`](crate::BinaryReader) and
/// [`BinaryWriter`](crate::BinaryWriter).
#[derive(Debug, Error)]
pub enum CodecError {
    /// The stream ended before a full value arrived.
    #[error("Short read: expected {expected} element(s), got {got}")]
    ShortRead {
        /// Elements requested.
        expected: usize,
        /// Whole elements actually read.
        got: usize,
    },

    /// Underlying stream failure.
    #[error("Stream error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for codec operations.
pub type CodecResult<T> = std::result::Result<T, CodecError>;
