//! Aerodynamic database (ADB) loading and writing.
//!
//! An ADB file is the binary result of a vortex-lattice or panel solver run.
//! It holds one mesh section followed by one fixed-shape block per solution
//! case. Byte order is detected from the leading sentinel; files written on
//! a machine of the other endianness load transparently.
//!
//! # Layout
//!
//! 1. Sentinel (`v2` or `v3`)
//! 2. Header: model, flags, counts, reference quantities
//! 3. Component tables: wings, bodies, parametric surfaces
//! 4. Triangles (1-based node ids in the file), then nodes
//! 5. Propulsion: rotors, plus nozzles in `v3`
//! 6. Multigrid levels, Kutta edges and nodes, control surfaces
//! 7. Solution case blocks
//!
//! # Example
//!
//! ```no_run
//! use aero_adb::AdbFile;
//!
//! let mut adb = AdbFile::open("wing").unwrap();
//! println!("{} triangles", adb.mesh().mesh.tri_count());
//! while let Some(case) = adb.next_case().unwrap() {
//!     let nodal = case.nodal_cp(&adb.mesh().mesh);
//!     println!("case {} mach {:.3}: {} nodes", case.index, case.mach, nodal.len());
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod case;
mod case_list;
mod cursor;
mod error;
mod file;
mod format;
mod header;
mod mesh;
mod reader;
mod writer;

pub use case::{SolutionCase, WakeLine};
pub use case_list::{CaseListEntry, format_case_list, load_case_list, parse_case_list};
pub use cursor::{CaseCursor, CaseStream, Sequential};
pub use error::{AdbError, AdbResult};
pub use file::AdbFile;
pub use format::{
    FileVersion, MAGIC_V2, MAGIC_V3, ModelType, NAME_WIDTH, NOZZLE_RECORD_LEN, ROTOR_RECORD_LEN,
    detect_version,
};
pub use header::{AdbHeader, ReferenceQuantities};
pub use mesh::{
    CaseLayout, ComponentEntry, ComponentTables, ControlSurface, LevelEdge, LoadedAeroMesh,
    MeshLevel, PropulsionRecords,
};
pub use reader::read_mesh;
pub use writer::{adb_path, case_list_path, save_adb, write_adb};
