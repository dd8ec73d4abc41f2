//! Format constants and version detection.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Sentinel written first by a v2 database.
pub const MAGIC_V2: i32 = -123_789_456;

/// Sentinel written first by a v3 database.
pub const MAGIC_V3: i32 = MAGIC_V2 + 3;

/// Width of the fixed character field holding component names.
pub const NAME_WIDTH: usize = 100;

/// Number of `f64` values in one opaque rotor record.
pub const ROTOR_RECORD_LEN: usize = 11;

/// Number of `f64` values in one opaque nozzle record.
pub const NOZZLE_RECORD_LEN: usize = 7;

/// Record layout revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FileVersion {
    /// Rotors only.
    #[default]
    V2,
    /// Adds nozzle records after the rotors.
    V3,
}

impl FileVersion {
    /// Sentinel value for this version.
    #[must_use]
    pub const fn magic(self) -> i32 {
        match self {
            Self::V2 => MAGIC_V2,
            Self::V3 => MAGIC_V3,
        }
    }

    /// Version for a sentinel read in the current byte order.
    #[must_use]
    pub const fn from_magic(value: i32) -> Option<Self> {
        match value {
            MAGIC_V2 => Some(Self::V2),
            MAGIC_V3 => Some(Self::V3),
            _ => None,
        }
    }

    /// Whether the propulsion section carries nozzle records.
    #[must_use]
    pub const fn has_nozzles(self) -> bool {
        matches!(self, Self::V3)
    }
}

/// Aerodynamic model kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ModelType {
    /// Zero-thickness vortex-lattice surfaces.
    #[default]
    VortexLattice,
    /// Closed thick panel surfaces.
    Panel,
    /// Any other code, kept for re-emission.
    Other(i32),
}

impl ModelType {
    /// Decode the header code.
    #[must_use]
    pub const fn from_code(code: i32) -> Self {
        match code {
            1 => Self::VortexLattice,
            2 => Self::Panel,
            other => Self::Other(other),
        }
    }

    /// Header code.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::VortexLattice => 1,
            Self::Panel => 2,
            Self::Other(code) => code,
        }
    }

    /// Whether this is a vortex-lattice model.
    #[must_use]
    pub const fn is_vortex_lattice(self) -> bool {
        matches!(self, Self::VortexLattice)
    }
}

/// Identify the version from the first four bytes as read natively.
///
/// Returns the version and whether the rest of the file must be byte-swapped.
/// Reversing the bytes of the native value is the same as rewinding and
/// re-reading with swapping on.
#[must_use]
pub const fn detect_version(native: i32) -> Option<(FileVersion, bool)> {
    if let Some(version) = FileVersion::from_magic(native) {
        return Some((version, false));
    }
    match FileVersion::from_magic(native.swap_bytes()) {
        Some(version) => Some((version, true)),
        None => None,
    }
}
