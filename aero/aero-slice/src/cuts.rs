//! The `.cuts` plane list.
//!
//! ```text
//! 3
//! x 0.5
//! y 2.0
//! z -1.25
//! ```
//!
//! Whitespace between tokens is free-form; line breaks are not significant.

use std::path::Path;

use aero_types::Axis;

use crate::error::{SliceError, SliceResult};
use crate::plane::CuttingPlane;

/// Parse a cut list: a count followed by that many `<axis> <value>` pairs.
///
/// Axis letters are accepted in either case.
///
/// # Errors
///
/// [`SliceError::MalformedCuts`] for a bad count, a bad axis or number, or a
/// number of pairs that differs from the count.
///
/// # Example
///
/// ```
/// use aero_slice::{CuttingPlane, parse_cuts};
///
/// let planes = parse_cuts("2\nx 0.5\nZ -1\n").unwrap();
/// assert_eq!(planes, vec![CuttingPlane::x(0.5), CuttingPlane::z(-1.0)]);
/// ```
pub fn parse_cuts(text: &str) -> SliceResult<Vec<CuttingPlane>> {
    let mut tokens = text.split_whitespace();

    let count_token = tokens
        .next()
        .ok_or_else(|| SliceError::malformed("missing cut count"))?;
    let count: usize = count_token
        .parse()
        .map_err(|_| SliceError::malformed(format!("bad cut count '{count_token}'")))?;

    let mut planes = Vec::with_capacity(count);
    for k in 1..=count {
        let (Some(axis), Some(value)) = (tokens.next(), tokens.next()) else {
            return Err(SliceError::malformed(format!(
                "expected {count} cuts, found {}",
                k - 1
            )));
        };
        let axis: Axis = axis
            .parse()
            .map_err(|e| SliceError::malformed(format!("cut {k}: {e}")))?;
        let value: f64 = value
            .parse()
            .map_err(|_| SliceError::malformed(format!("cut {k}: bad value '{value}'")))?;
        planes.push(CuttingPlane::new(axis, value));
    }

    if let Some(extra) = tokens.next() {
        return Err(SliceError::malformed(format!(
            "expected {count} cuts, found trailing '{extra}'"
        )));
    }
    Ok(planes)
}

/// Read and parse a cuts file.
///
/// # Errors
///
/// [`SliceError::FileNotFound`] / [`SliceError::Unreadable`] for I/O
/// failures, otherwise as [`parse_cuts`].
pub fn load_cuts<P: AsRef<Path>>(path: P) -> SliceResult<Vec<CuttingPlane>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            SliceError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            SliceError::Unreadable {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;
    parse_cuts(&text)
}

/// Format planes in the layout [`parse_cuts`] reads, lower-case axes.
#[must_use]
pub fn format_cuts(planes: &[CuttingPlane]) -> String {
    let lines = planes
        .iter()
        .map(|plane| format!("{} {}\n", plane.axis.label().to_ascii_lowercase(), plane.value));
    std::iter::once(format!("{}\n", planes.len())).chain(lines).collect()
}
