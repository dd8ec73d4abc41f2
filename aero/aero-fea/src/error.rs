//! Error types for structural deck and results processing.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result type for FEA operations.
pub type FeaResult<T> = Result<T, FeaError>;

/// Errors raised while reading, rewriting, or sizing a structural model.
#[derive(Debug, Error)]
pub enum FeaError {
    /// The deck or results file does not exist.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path that was not found.
        path: PathBuf,
    },

    /// The file exists but could not be read or created.
    #[error("cannot access {path}: {source}")]
    Unreadable {
        /// Path being accessed.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: std::io::Error,
    },

    /// A deck card or its data lines could not be understood, or a
    /// required card is missing.
    #[error("malformed {keyword} card at line {line}: {detail}")]
    MalformedDeck {
        /// Keyword of the offending card, e.g. `*ELEMENT`.
        keyword: String,
        /// 1-based line number, 0 when the card is missing entirely.
        line: usize,
        /// What was wrong.
        detail: String,
    },

    /// A required block of the results file is missing or unreadable.
    #[error("malformed results file: missing or bad {section} block")]
    MalformedResults {
        /// Block name, e.g. `2C` or `STRESS`.
        section: String,
    },

    /// Failure writing output.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FeaError {
    /// Create a `MalformedDeck` error.
    #[must_use]
    pub fn malformed(keyword: impl Into<String>, line: usize, detail: impl Into<String>) -> Self {
        Self::MalformedDeck {
            keyword: keyword.into(),
            line,
            detail: detail.into(),
        }
    }

    /// Create a `MalformedResults` error.
    #[must_use]
    pub fn results(section: impl Into<String>) -> Self {
        Self::MalformedResults {
            section: section.into(),
        }
    }

    pub(crate) fn open(path: &Path, e: std::io::Error) -> Self {
        if e.kind() == ErrorKind::NotFound {
            Self::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            Self::Unreadable {
                path: path.to_path_buf(),
                source: e,
            }
        }
    }
}
