//! Error types for database loading and writing.

use std::path::PathBuf;

use aero_codec::CodecError;
use thiserror::Error;

/// Result type for database operations.
pub type AdbResult<T> = Result<T, AdbError>;

/// Errors raised while reading or writing an aerodynamic database.
#[derive(Debug, Error)]
pub enum AdbError {
    /// The `.adb` file does not exist.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path that was not found.
        path: PathBuf,
    },

    /// The file exists but could not be opened or read.
    #[error("cannot read {path}: {source}")]
    Unreadable {
        /// Path being read.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: std::io::Error,
    },

    /// The leading sentinel matches no known version in either byte order.
    #[error("unrecognized database sentinel {found}")]
    FormatVersionMismatch {
        /// Sentinel as read in native order.
        found: i32,
    },

    /// The stream ended or failed inside a section.
    #[error("truncated database in {section}: {source}")]
    Truncated {
        /// Section being decoded.
        section: &'static str,
        /// Codec failure.
        #[source]
        source: CodecError,
    },

    /// A count or index field holds an impossible value.
    #[error("invalid {what}: {value}")]
    InvalidCount {
        /// Field name.
        what: &'static str,
        /// Value found.
        value: i64,
    },

    /// A case number outside `1..=available`.
    #[error("case {requested} out of range (1..={available})")]
    CaseOutOfRange {
        /// Requested case, 1-based.
        requested: usize,
        /// Number of cases known.
        available: usize,
    },

    /// A sequential-only stream was asked to go back.
    #[error("case {requested} is behind the cursor (next is {next})")]
    CaseBehindCursor {
        /// Requested case, 1-based.
        requested: usize,
        /// Case the cursor would read next.
        next: usize,
    },

    /// A line of the `.adb.cases` list could not be parsed.
    #[error("malformed case list at line {line}: {reason}")]
    MalformedCaseList {
        /// Line number, 1-based.
        line: usize,
        /// What was wrong.
        reason: String,
    },

    /// Write failure.
    #[error("write failed: {0}")]
    Write(#[source] CodecError),
}

/// Attach a section name to codec failures.
pub(crate) trait InSection<T> {
    fn in_section(self, section: &'static str) -> AdbResult<T>;
}

impl<T> InSection<T> for Result<T, CodecError> {
    fn in_section(self, section: &'static str) -> AdbResult<T> {
        self.map_err(|source| AdbError::Truncated { section, source })
    }
}

/// Convert a file count field to `usize`, rejecting negatives.
pub(crate) fn count(what: &'static str, value: i32) -> AdbResult<usize> {
    usize::try_from(value).map_err(|_| AdbError::InvalidCount {
        what,
        value: i64::from(value),
    })
}

/// Initial capacity for `n` records announced by a header. Larger counts
/// grow as records arrive.
pub(crate) fn capacity(n: usize) -> usize {
    const PREALLOC_LIMIT: usize = 4096;
    n.min(PREALLOC_LIMIT)
}
