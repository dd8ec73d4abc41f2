//! The `.slc` text format.

use std::io::{self, Write};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::slicer::SliceBlock;

/// Which scalar the fourth column carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ScalarKind {
    /// Pressure jump across a lifting surface (vortex-lattice solutions).
    #[default]
    PressureJump,
    /// Surface pressure coefficient (panel solutions).
    Pressure,
}

impl ScalarKind {
    /// Column header line, without the newline.
    #[must_use]
    pub const fn header(self) -> &'static str {
        match self {
            Self::PressureJump => "     x          y          z         dCp",
            Self::Pressure => "     x          y          z          Cp",
        }
    }
}

/// Flow condition printed above every block of a case.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CaseLabel {
    /// 1-based case number.
    pub index: usize,
    /// Mach number.
    pub mach: f64,
    /// Angle of attack in degrees.
    pub alpha: f64,
    /// Sideslip in degrees.
    pub beta: f64,
    /// Free-text comment.
    pub comment: String,
}

/// Write one case: a block per plane, then a blank line pair.
///
/// Planes are numbered from 1 in the order given. A plane with no points
/// still gets its header lines.
///
/// # Errors
///
/// Propagates write failures.
///
/// # Example
///
/// ```
/// use aero_slice::{CaseLabel, CuttingPlane, ScalarKind, SliceBlock, write_slice_blocks};
///
/// let label = CaseLabel { index: 1, mach: 0.3, alpha: 2.0, beta: 0.0, comment: "cruise".into() };
/// let blocks = [SliceBlock { plane: CuttingPlane::y(1.0), points: Vec::new() }];
///
/// let mut out = Vec::new();
/// write_slice_blocks(&mut out, &label, ScalarKind::Pressure, &blocks).unwrap();
/// let text = String::from_utf8(out).unwrap();
/// assert!(text.starts_with("BLOCK Cut_1_at_Y:_1.000000 \n"));
/// assert!(text.ends_with("Cp\n\n\n"));
/// ```
pub fn write_slice_blocks<W: Write>(
    out: &mut W,
    label: &CaseLabel,
    kind: ScalarKind,
    blocks: &[SliceBlock],
) -> io::Result<()> {
    for (k, block) in blocks.iter().enumerate() {
        writeln!(
            out,
            "BLOCK Cut_{}_at_{}:_{:.6} ",
            k + 1,
            block.plane.axis,
            block.plane.value
        )?;
        writeln!(
            out,
            "Case: {} ... Mach: {:.6} ... Alpha: {:.6} ... Beta: {:.6} ... {} ",
            label.index, label.mach, label.alpha, label.beta, label.comment
        )?;
        writeln!(out, "{}", kind.header())?;
        for point in &block.points {
            let p = &point.position;
            writeln!(
                out,
                "{:10.4} {:10.4} {:10.4} {:10.4} ",
                p.x, p.y, p.z, point.value
            )?;
        }
    }
    out.write_all(b"\n\n")
}
