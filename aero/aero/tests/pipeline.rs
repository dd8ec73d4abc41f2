//! End-to-end regression tests for the file-level pipeline.
//!
//! Each test writes its inputs into a temporary directory, runs one
//! pipeline operation and checks the files it produces.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::fs;
use std::path::Path;

use aero::AeroError;
use aero::adb::{AdbError, AdbHeader, FileVersion, LoadedAeroMesh, ModelType, SolutionCase, save_adb};
use aero::fea::{Deck, FeaError, MergeParams, SizingParams};
use aero::pipeline::{
    TransferParams, clean_deck_file, interpolate_to_deck, merge_deck_files, optimize_deck_file,
    renumber_deck_file, scale_deck_pressures, slice_database,
};
use aero::slice::SliceParams;
use aero::types::{Point3, TriMesh};
use approx::assert_relative_eq;

// =============================================================================
// Fixtures
// =============================================================================

/// Unit square at z = 0 as a panel database with one case per Cp value.
fn write_square_database(base: &Path, cps: &[f64]) {
    let mesh = TriMesh::from_parts(
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ],
        &[[0, 1, 2], [0, 2, 3]],
    );
    let db = LoadedAeroMesh::new(AdbHeader::new(FileVersion::V3, ModelType::Panel), mesh);
    let layout = db.case_layout();
    let cases: Vec<SolutionCase> = cps
        .iter()
        .enumerate()
        .map(|(i, &cp)| {
            let mut case = SolutionCase::zeroed(i + 1, &layout);
            case.mach = 0.3;
            case.alpha = 2.0;
            case.cp = vec![cp; layout.tris];
            case.comment = format!("case{}", i + 1);
            case
        })
        .collect();
    save_adb(base, &db, &cases, false).unwrap();
}

const SKIN: &str = "\
*NODE, NSET=NSkin
1, 0.1, 0.0, 0.0
2, 0.6, 0.0, 0.0
3, 0.1, 0.5, 0.0
*ELEMENT, TYPE=S3, ELSET=ESkin
101, 1, 2, 3
*SHELL SECTION, ELSET=ESkin, MATERIAL=Al
0.02
**Materials
*MATERIAL, NAME=Al
*ELASTIC
7.0e10, 0.33
";

/// One 6-node wedge, 0.02 thick over the unit right triangle, under
/// uniaxial stress 4.32e6 at every node.
const WEDGE_FRD: &str = "\
    1C
    2C                             6                                     1
 -1         1 0.00000E+00 0.00000E+00 2.00000E-02
 -1         2 1.00000E+00 0.00000E+00 2.00000E-02
 -1         3 0.00000E+00 1.00000E+00 2.00000E-02
 -1         4 0.00000E+00 0.00000E+00 0.00000E+00
 -1         5 1.00000E+00 0.00000E+00 0.00000E+00
 -1         6 0.00000E+00 1.00000E+00 0.00000E+00
 -3
    3C                             1                                     1
 -1         1    2    0    1
 -2         1         2         3         4         5         6
 -3
    1PSTEP                         1           1           1
 -4  DISP        4    1
 -5  D1          1    2    1    0
 -1         1 1.00000E-04-2.00000E-04 0.00000E+00
 -3
 -4  STRESS      6    1
 -5  SXX         1    4    1    1
 -1         1 4.32000E+06 0.00000E+00 0.00000E+00 0.00000E+00 0.00000E+00 0.00000E+00
 -1         2 4.32000E+06 0.00000E+00 0.00000E+00 0.00000E+00 0.00000E+00 0.00000E+00
 -1         3 4.32000E+06 0.00000E+00 0.00000E+00 0.00000E+00 0.00000E+00 0.00000E+00
 -1         4 4.32000E+06 0.00000E+00 0.00000E+00 0.00000E+00 0.00000E+00 0.00000E+00
 -1         5 4.32000E+06 0.00000E+00 0.00000E+00 0.00000E+00 0.00000E+00 0.00000E+00
 -1         6 4.32000E+06 0.00000E+00 0.00000E+00 0.00000E+00 0.00000E+00 0.00000E+00
 -3
 9999
";

const PANEL: &str = "\
*NODE, NSET=NPanel
1, 0.0, 0.0, 0.0
2, 1.0, 0.0, 0.0
3, 0.0, 1.0, 0.0
*ELEMENT, TYPE=S3, ELSET=ESkin
1, 1, 2, 3
*SHELL SECTION, ELSET=ESkin, MATERIAL=Al
0.02
*MATERIAL, NAME=Al
*ELASTIC
7.0e10, 0.33
";

// =============================================================================
// Slicing
// =============================================================================

#[test]
fn slice_every_case() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("square");
    write_square_database(&base, &[0.4, -0.2]);
    fs::write(dir.path().join("square.cuts"), "1\nx 0.5\n").unwrap();

    let summary = slice_database(&base, &SliceParams::default()).unwrap();
    assert_eq!(summary.cases, 2);
    assert_eq!(summary.planes, 1);
    assert!(summary.points > 0);

    let text = fs::read_to_string(dir.path().join("square.slc")).unwrap();
    assert_eq!(text.matches("BLOCK Cut_1_at_X:_0.500000 \n").count(), 2);
    assert!(text.contains("Case: 1 ... Mach: 0.300000"));
    assert!(text.contains("... case2 \n"));
    assert!(text.contains("    0.5000 "));
    assert!(text.contains("    0.4000 \n"));
    assert!(text.contains("   -0.2000 \n"));
    assert!(text.lines().nth(2).unwrap().ends_with("Cp"));
}

#[test]
fn slice_without_cuts_file() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("square");
    write_square_database(&base, &[0.1]);
    assert!(matches!(
        slice_database(&base, &SliceParams::default()),
        Err(AeroError::Slice(_))
    ));
}

// =============================================================================
// Load transfer
// =============================================================================

#[test]
fn transfer_writes_static_and_buckle_decks() {
    let dir = tempfile::tempdir().unwrap();
    let aero = dir.path().join("square");
    let skin = dir.path().join("skin");
    write_square_database(&aero, &[0.6]);
    fs::write(dir.path().join("skin.inp"), SKIN).unwrap();

    let transfer = interpolate_to_deck(&aero, &skin, &TransferParams::default()).unwrap();
    assert!(transfer.is_complete());
    assert_relative_eq!(transfer.loads[0].unwrap().cp, 0.6, epsilon = 1e-12);

    let static_deck = fs::read_to_string(dir.path().join("skin.static.inp")).unwrap();
    assert!(static_deck.contains("*BOUNDARY\n1, 1, 6\n2, 1, 6\n**Materials"));
    assert!(static_deck.contains("*STATIC, DIRECT\n*DLOAD\n101, P1, -0.6\n"));
    let buckle = fs::read_to_string(dir.path().join("skin.buckle.inp")).unwrap();
    assert!(buckle.contains("*BUCKLE\n10,0.01\n*DLOAD\n101, P1, -0.6\n"));

    let reparsed = Deck::load(dir.path().join("skin.static.inp")).unwrap();
    assert_eq!(reparsed.steps().count(), 1);
}

#[test]
fn transfer_missing_case_fails() {
    let dir = tempfile::tempdir().unwrap();
    let aero = dir.path().join("square");
    write_square_database(&aero, &[0.6]);
    fs::write(dir.path().join("skin.inp"), SKIN).unwrap();

    let params = TransferParams::default().with_case(4);
    assert!(matches!(
        interpolate_to_deck(&aero, dir.path().join("skin"), &params),
        Err(AeroError::Adb(AdbError::CaseOutOfRange { .. }))
    ));
}

#[test]
fn missing_database_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        interpolate_to_deck(dir.path().join("absent"), dir.path().join("skin"), &TransferParams::default()),
        Err(AeroError::Adb(AdbError::FileNotFound { .. }))
    ));
}

// =============================================================================
// Deck editing
// =============================================================================

#[test]
fn merge_then_renumber_files() {
    let dir = tempfile::tempdir().unwrap();
    let with_step = format!("{SKIN}*STEP\n*STATIC\n*DLOAD\n101, P1, -1.0\n*END STEP\n");
    fs::write(dir.path().join("left.inp"), &with_step).unwrap();
    let right = with_step
        .replace("\n1, ", "\n11, ")
        .replace("\n2, ", "\n12, ")
        .replace("\n3, ", "\n13, ")
        .replace("101, 1, 2, 3", "201, 11, 12, 13")
        .replace("101, P1", "201, P1");
    fs::write(dir.path().join("right.inp"), right).unwrap();

    let merged = merge_deck_files(
        dir.path().join("left"),
        dir.path().join("right"),
        dir.path().join("both"),
        &MergeParams::default().with_labels("l", "r"),
    )
    .unwrap();
    assert_eq!(merged.nodes().count(), 6);

    let text = fs::read_to_string(dir.path().join("both.inp")).unwrap();
    assert!(text.contains("left"));
    assert!(text.contains("*NSET, NSET=NALL, GENERATE"));
    assert!(text.contains("101, P1, -1.0\n201, P1, -1.0\n"));

    let map = renumber_deck_file(dir.path().join("both")).unwrap();
    assert_eq!(map.node(13), Some(6));
    assert_eq!(map.element(201), Some(2));
    let dense = Deck::load(dir.path().join("both.renum.inp")).unwrap();
    let ids: Vec<u32> = dense.nodes().map(|n| n.id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5, 6]);
    let text = fs::read_to_string(dir.path().join("both.renum.inp")).unwrap();
    assert!(text.contains("*NSET, NSET=NALL, GENERATE\n1, 6, 1\n"));
}

#[test]
fn clean_and_scale_files() {
    let dir = tempfile::tempdir().unwrap();
    let deck = "*NODE\n1, 0, 0, 0\n2, 1, 0, 0\n3, 0, 1, 0\n\
                *ELEMENT, TYPE=S3, ELSET=ESkin\n1, 1, 2, 3\n2, 1, 1, 3\n\
                *STEP\n*STATIC\n*DLOAD\n1, P1, -0.6\n*END STEP\n";
    fs::write(dir.path().join("raw.inp"), deck).unwrap();

    let dropped = clean_deck_file(dir.path().join("raw"), dir.path().join("clean")).unwrap();
    assert_eq!(dropped, vec![2]);
    let scaled = scale_deck_pressures(dir.path().join("clean"), dir.path().join("scaled"), 2.0)
        .unwrap();
    assert_eq!(scaled, 1);

    let text = fs::read_to_string(dir.path().join("scaled.inp")).unwrap();
    assert!(text.contains("1, P1, -1.2\n"));
    assert!(!text.contains("2, 1, 1, 3"));
}

#[test]
fn missing_deck_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        renumber_deck_file(dir.path().join("absent")),
        Err(AeroError::Fea(FeaError::FileNotFound { .. }))
    ));
}

// =============================================================================
// Sizing
// =============================================================================

#[test]
fn optimize_writes_sized_and_regrouped_deck() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("panel.inp"), PANEL).unwrap();
    fs::write(dir.path().join("panel.frd"), WEDGE_FRD).unwrap();

    let out = optimize_deck_file(
        dir.path().join("panel"),
        dir.path().join("panel"),
        dir.path().join("panel_sized"),
        &SizingParams::default(),
        "ESkin",
    )
    .unwrap();
    assert!(out.report.skipped.is_empty());
    assert_relative_eq!(out.report.wetted_area, 0.5, epsilon = 1e-9);
    assert_relative_eq!(out.report.new_volume, out.report.old_volume, epsilon = 1e-9);

    let sized = fs::read_to_string(dir.path().join("panel.sized")).unwrap();
    assert_eq!(sized, "1 0.020000\n");
    let deck = fs::read_to_string(dir.path().join("panel_sized.inp")).unwrap();
    assert!(deck.contains("*ELEMENT, TYPE=S3, ELSET=ESkin.2\n1, 1, 2, 3\n"));
    assert!(deck.contains("*SHELL SECTION, ELSET=ESkin.2, MATERIAL=Al, OFFSET=-0.5\n"));
}

#[test]
fn optimize_without_results_fails() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("panel.inp"), PANEL).unwrap();
    let err = optimize_deck_file(
        dir.path().join("panel"),
        dir.path().join("panel"),
        dir.path().join("out"),
        &SizingParams::default(),
        "ESkin",
    )
    .unwrap_err();
    assert!(matches!(err, AeroError::Fea(FeaError::FileNotFound { .. })));
}
