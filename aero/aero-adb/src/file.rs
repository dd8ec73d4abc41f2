//! Opening a database from disk.

use std::fs::File;
use std::io::{BufReader, ErrorKind};
use std::path::{Path, PathBuf};

use aero_codec::BinaryReader;
use tracing::{debug, info};

use crate::case::SolutionCase;
use crate::case_list::{CaseListEntry, load_case_list};
use crate::cursor::{CaseCursor, CaseStream};
use crate::error::{AdbError, AdbResult};
use crate::mesh::LoadedAeroMesh;
use crate::reader::read_mesh;
use crate::writer::{adb_path, case_list_path};

/// An open database: the mesh section plus a cursor over its cases.
#[derive(Debug)]
pub struct AdbFile<R> {
    mesh: LoadedAeroMesh,
    cases: Vec<CaseListEntry>,
    cursor: CaseCursor<R>,
}

impl AdbFile<BufReader<File>> {
    /// Open `<base>.adb` and, if present, `<base>.adb.cases`.
    ///
    /// # Errors
    ///
    /// - [`AdbError::FileNotFound`] if `<base>.adb` does not exist
    /// - [`AdbError::Unreadable`] for other open failures
    /// - any mesh-section error from [`read_mesh`]
    /// - [`AdbError::MalformedCaseList`] for a bad case list
    pub fn open<P: AsRef<Path>>(base: P) -> AdbResult<Self> {
        let base = base.as_ref();
        let path = adb_path(base);
        let file = File::open(&path).map_err(|e| open_error(path.clone(), e))?;

        let cases = match load_case_list(case_list_path(base)) {
            Ok(cases) => cases,
            Err(AdbError::FileNotFound { path }) => {
                debug!(path = %path.display(), "No case list");
                Vec::new()
            }
            Err(e) => return Err(e),
        };

        let db = Self::from_reader(BufReader::new(file), cases)?;
        info!(
            path = %path.display(),
            version = ?db.mesh.header.version,
            cases = db.cases.len(),
            "Opened aerodynamic database"
        );
        Ok(db)
    }
}

fn open_error(path: PathBuf, e: std::io::Error) -> AdbError {
    if e.kind() == ErrorKind::NotFound {
        AdbError::FileNotFound { path }
    } else {
        AdbError::Unreadable { path, source: e }
    }
}

impl<R: CaseStream> AdbFile<R> {
    /// Read the mesh section from any stream.
    ///
    /// # Errors
    ///
    /// Any mesh-section error from [`read_mesh`].
    pub fn from_reader(stream: R, cases: Vec<CaseListEntry>) -> AdbResult<Self> {
        let mut reader = BinaryReader::new(stream);
        let mesh = read_mesh(&mut reader)?;
        let cursor = CaseCursor::new(reader, mesh.case_layout()).with_case_list(cases.clone());
        Ok(Self {
            mesh,
            cases,
            cursor,
        })
    }

    /// The mesh section.
    #[must_use]
    pub const fn mesh(&self) -> &LoadedAeroMesh {
        &self.mesh
    }

    /// Entries of the case list, empty when none was found.
    #[must_use]
    pub fn case_list(&self) -> &[CaseListEntry] {
        &self.cases
    }

    /// Read the next case in file order.
    ///
    /// # Errors
    ///
    /// See [`CaseCursor::next_case`].
    pub fn next_case(&mut self) -> AdbResult<Option<SolutionCase>> {
        self.cursor.next_case()
    }

    /// Read case `n` (1-based).
    ///
    /// # Errors
    ///
    /// See [`CaseCursor::goto_case`].
    pub fn goto_case(&mut self, n: usize) -> AdbResult<SolutionCase> {
        self.cursor.goto_case(n)
    }

    /// Split into the mesh section and the case cursor.
    pub fn into_parts(self) -> (LoadedAeroMesh, CaseCursor<R>) {
        (self.mesh, self.cursor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{FileVersion, ModelType};
    use crate::header::AdbHeader;
    use crate::writer::save_adb;
    use aero_types::{Point3, TriMesh};

    fn tiny() -> LoadedAeroMesh {
        let mesh = TriMesh::from_parts(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            &[[0, 1, 2], [0, 2, 3]],
        );
        LoadedAeroMesh::new(AdbHeader::new(FileVersion::V2, ModelType::Panel), mesh)
    }

    #[test]
    fn missing_database() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            AdbFile::open(dir.path().join("absent")),
            Err(AdbError::FileNotFound { .. })
        ));
    }

    #[test]
    fn open_reads_cases_and_comments() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("wing");
        let db = tiny();
        let layout = db.case_layout();
        let mut first = SolutionCase::zeroed(1, &layout);
        first.mach = 0.25;
        first.comment = "first".into();
        let mut second = SolutionCase::zeroed(2, &layout);
        second.cp = vec![0.5, -0.5];
        second.comment = "second".into();
        save_adb(&base, &db, &[first, second], false).unwrap();

        let mut file = AdbFile::open(&base).unwrap();
        assert_eq!(file.mesh().mesh.tri_count(), 2);
        assert_eq!(file.case_list().len(), 2);
        let case = file.goto_case(2).unwrap();
        assert_eq!(case.comment, "second");
        assert_eq!(case.cp, vec![0.5, -0.5]);
        let case = file.goto_case(1).unwrap();
        assert_eq!(case.comment, "first");
        assert!((case.mach - 0.25).abs() < 1e-7);
    }

    #[test]
    fn open_without_case_list() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("body");
        save_adb(&base, &tiny(), &[], false).unwrap();
        std::fs::remove_file(case_list_path(&base)).unwrap();

        let mut file = AdbFile::open(&base).unwrap();
        assert!(file.case_list().is_empty());
        assert!(file.next_case().unwrap().is_none());
    }
}
