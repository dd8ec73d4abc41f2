//! The `.adb.cases` text list.

use std::path::Path;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{AdbError, AdbResult};

/// One line of the case list.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CaseListEntry {
    /// Mach number.
    pub mach: f64,
    /// Angle of attack in degrees.
    pub alpha: f64,
    /// Sideslip angle in degrees.
    pub beta: f64,
    /// Rest of the line, trimmed.
    pub comment: String,
}

impl CaseListEntry {
    /// Create an entry.
    #[must_use]
    pub fn new(mach: f64, alpha: f64, beta: f64, comment: impl Into<String>) -> Self {
        Self {
            mach,
            alpha,
            beta,
            comment: comment.into(),
        }
    }
}

/// Parse a case list, one case per line: `<mach> <alpha> <beta> <comment...>`.
///
/// Blank lines are skipped.
///
/// # Errors
///
/// Returns [`AdbError::MalformedCaseList`] for a missing or non-numeric field.
///
/// # Example
///
/// ```
/// use aero_adb::parse_case_list;
///
/// let cases = parse_case_list("0.3 2.0 0.0 Cruise point\n0.5 4 0 Climb\n").unwrap();
/// assert_eq!(cases.len(), 2);
/// assert_eq!(cases[0].comment, "Cruise point");
/// ```
pub fn parse_case_list(text: &str) -> AdbResult<Vec<CaseListEntry>> {
    let mut entries = Vec::new();
    for (i, line) in text.lines().enumerate() {
        let line_no = i + 1;
        if line.trim().is_empty() {
            continue;
        }

        let mut rest = line.trim_start();
        let mut fields = [0.0; 3];
        for (slot, name) in fields.iter_mut().zip(["mach", "alpha", "beta"]) {
            let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
            let token = &rest[..end];
            *slot = token.parse().map_err(|_| AdbError::MalformedCaseList {
                line: line_no,
                reason: if token.is_empty() {
                    format!("missing {name}")
                } else {
                    format!("bad {name} '{token}'")
                },
            })?;
            rest = rest[end..].trim_start();
        }

        entries.push(CaseListEntry::new(
            fields[0],
            fields[1],
            fields[2],
            rest.trim_end(),
        ));
    }
    Ok(entries)
}

/// Read and parse `<path>`.
///
/// # Errors
///
/// [`AdbError::FileNotFound`] / [`AdbError::Unreadable`] for I/O failures,
/// otherwise as [`parse_case_list`].
pub fn load_case_list<P: AsRef<Path>>(path: P) -> AdbResult<Vec<CaseListEntry>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            AdbError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            AdbError::Unreadable {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;
    parse_case_list(&text)
}

/// Format entries in the same layout [`parse_case_list`] reads.
#[must_use]
pub fn format_case_list(entries: &[CaseListEntry]) -> String {
    entries
        .iter()
        .map(|e| format!("{:.6} {:.6} {:.6} {}\n", e.mach, e.alpha, e.beta, e.comment))
        .collect()
}
