//! Property-based round-trip tests for whole databases.
//!
//! Databases are generated from `f32`-representable values so that every
//! field survives the narrowing on write exactly.
//!
//! Run with: cargo test -p aero-adb -- proptest

use std::io::Cursor;

use aero_adb::{
    AdbError, AdbFile, AdbHeader, CaseLayout, CaseListEntry, ComponentEntry, ControlSurface,
    FileVersion, LevelEdge, LoadedAeroMesh, MeshLevel, ModelType, ReferenceQuantities,
    SolutionCase, WakeLine, read_mesh, write_adb,
};
use aero_codec::{BinaryReader, BinaryWriter};
use aero_types::{Point3, Tri, TriMesh, Vector3};
use proptest::prelude::*;

// =============================================================================
// Strategies
// =============================================================================

fn arb_f32() -> impl Strategy<Value = f64> {
    (-1.0e4..1.0e4f32).prop_map(f64::from)
}

fn arb_point() -> impl Strategy<Value = Point3<f64>> {
    (arb_f32(), arb_f32(), arb_f32()).prop_map(|(x, y, z)| Point3::new(x, y, z))
}

fn arb_entry() -> impl Strategy<Value = ComponentEntry> {
    (any::<i32>(), "[A-Za-z0-9_]{0,40}", any::<i32>())
        .prop_map(|(id, name, component)| ComponentEntry::new(id, name, component))
}

fn arb_mesh() -> impl Strategy<Value = TriMesh> {
    prop::collection::vec(arb_point(), 3..20).prop_flat_map(|nodes| {
        let n = u32::try_from(nodes.len()).unwrap();
        let tri = (
            prop::array::uniform3(0..n),
            -3..3i32,
            0..10i32,
            (0.0..50.0f32).prop_map(f64::from),
        )
            .prop_map(|(nodes, kind, id, area)| {
                Tri::new(nodes).with_surface(kind, id).with_area(area)
            });
        prop::collection::vec(tri, 1..30).prop_map(move |tris| TriMesh {
            nodes: nodes.clone(),
            tris,
        })
    })
}

fn arb_level() -> impl Strategy<Value = MeshLevel> {
    prop::collection::vec(arb_point(), 2..10).prop_flat_map(|nodes| {
        let n = u32::try_from(nodes.len()).unwrap();
        let edge = (1..20i32, 0..n, 0..n, any::<bool>(), any::<bool>()).prop_map(
            |(surface_id, a, b, boundary, kutta)| LevelEdge {
                surface_id,
                nodes: [a, b],
                boundary,
                kutta,
            },
        );
        prop::collection::vec(edge, 0..12).prop_map(move |edges| MeshLevel {
            nodes: nodes.clone(),
            edges,
        })
    })
}

fn arb_control_surface() -> impl Strategy<Value = ControlSurface> {
    (
        prop::collection::vec(arb_point(), 0..5),
        arb_point(),
        arb_point(),
        arb_point(),
        prop::collection::vec(any::<i32>(), 0..6),
    )
        .prop_map(|(nodes, hinge_start, hinge_end, axis, loops)| ControlSurface {
            nodes,
            hinge_start,
            hinge_end,
            hinge_vector: axis.coords,
            loops,
        })
}

fn arb_database() -> impl Strategy<Value = LoadedAeroMesh> {
    (
        (
            any::<bool>(),
            prop_oneof![Just(ModelType::VortexLattice), Just(ModelType::Panel)],
            (0..3i32, 0..2i32, 0..6usize, 0..6usize),
            prop::array::uniform6(arb_f32()),
        ),
        (
            prop::collection::vec(arb_entry(), 0..3),
            prop::collection::vec(arb_entry(), 0..3),
            arb_mesh(),
        ),
        (
            prop::collection::vec(prop::array::uniform11(-1.0e6..1.0e6f64), 0..3),
            prop::collection::vec(prop::array::uniform7(-1.0e6..1.0e6f64), 0..3),
            prop::collection::vec(arb_level(), 0..3),
            prop::collection::vec(any::<i32>(), 0..4),
            prop::collection::vec(arb_control_surface(), 0..3),
        ),
    )
        .prop_map(
            |(
                (v3, model, (symmetry, unsteady, loops, edges), refs),
                (wings, bodies, mesh),
                (rotors, nozzles, mut levels, kutta_nodes, control_surfaces),
            )| {
                // Kutta flags are only stored for the finest level.
                for level in levels.iter_mut().skip(1) {
                    for edge in &mut level.edges {
                        edge.kutta = false;
                    }
                }
                let version = if v3 { FileVersion::V3 } else { FileVersion::V2 };
                let mut header = AdbHeader::new(version, model)
                    .with_vortex_counts(loops, edges)
                    .with_reference(ReferenceQuantities {
                        sref: refs[0],
                        cref: refs[1],
                        bref: refs[2],
                        cg: Point3::new(refs[3], refs[4], refs[5]),
                    });
                header.symmetry = symmetry;
                header.unsteady = unsteady;

                let mut db = LoadedAeroMesh::new(header, mesh);
                db.components.wings = wings;
                db.components.bodies = bodies;
                db.propulsion.rotors = rotors;
                if v3 {
                    db.propulsion.nozzles = nozzles;
                }
                db.levels = levels;
                db.kutta_nodes = kutta_nodes;
                db.control_surfaces = control_surfaces;
                db
            },
        )
}

fn arb_case(layout: CaseLayout, index: usize) -> impl Strategy<Value = SolutionCase> {
    (
        prop::array::uniform5(arb_f32()),
        prop::collection::vec(-1.0e3..1.0e3f64, layout.vortex_loops * 2),
        prop::collection::vec(arb_f32(), layout.tris),
        prop::collection::vec(
            (any::<i32>(), arb_f32(), prop::collection::vec(arb_point(), 0..4)),
            0..3,
        ),
        prop::collection::vec(arb_f32(), layout.control_surfaces),
    )
        .prop_map(move |(scalars, loops, cp, wakes, deflections)| {
            let mut case = SolutionCase::zeroed(index, &layout);
            case.mach = scalars[0];
            case.cp_min = scalars[3];
            case.cp_max = scalars[4];
            for (i, pair) in loops.chunks_exact(2).enumerate() {
                case.loop_gamma[i] = pair[0];
                case.loop_velocity[i] = Vector3::new(pair[1], -pair[0], 0.5);
            }
            case.cp = cp;
            case.wakes = wakes
                .into_iter()
                .map(|(wing_id, span, points)| WakeLine {
                    wing_id,
                    span,
                    points,
                })
                .collect();
            case.deflections = deflections;
            case
        })
}

fn encode(db: &LoadedAeroMesh, cases: &[SolutionCase], swap: bool) -> Vec<u8> {
    let mut writer = BinaryWriter::new(Vec::new());
    writer.set_swap(swap);
    write_adb(&mut writer, db, cases).unwrap();
    writer.into_inner()
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn proptest_mesh_roundtrip_both_orders(db in arb_database(), swap in any::<bool>()) {
        let bytes = encode(&db, &[], swap);
        let mut reader = BinaryReader::new(bytes.as_slice());
        let back = read_mesh(&mut reader).unwrap();
        prop_assert_eq!(reader.swaps(), swap);
        prop_assert_eq!(back, db);
    }

    #[test]
    fn proptest_cases_roundtrip(
        (db, cases) in arb_database().prop_flat_map(|db| {
            let layout = db.case_layout();
            let cases = (arb_case(layout, 1), arb_case(layout, 2));
            (Just(db), cases)
        }),
        swap in any::<bool>(),
    ) {
        let cases = [cases.0, cases.1];
        let bytes = encode(&db, &cases, swap);
        let mut file = AdbFile::from_reader(Cursor::new(bytes), Vec::new()).unwrap();

        let second = file.goto_case(2).unwrap();
        prop_assert_eq!(&second, &cases[1]);
        let first = file.goto_case(1).unwrap();
        prop_assert_eq!(&first, &cases[0]);
        prop_assert!(file.goto_case(3).is_err());
    }

    #[test]
    fn proptest_truncation_is_an_error(db in arb_database(), cut in 1usize..64) {
        let bytes = encode(&db, &[], false);
        let keep = bytes.len().saturating_sub(cut);
        let result = read_mesh(&mut BinaryReader::new(&bytes[..keep]));
        let truncated = matches!(result, Err(AdbError::Truncated { .. }));
        prop_assert!(truncated);
    }
}

// =============================================================================
// Fixed cases
// =============================================================================

#[test]
fn long_component_name_does_not_corrupt_ids() {
    let mesh = TriMesh::from_parts(
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ],
        &[[0, 1, 2]],
    );
    let mut db = LoadedAeroMesh::new(AdbHeader::new(FileVersion::V2, ModelType::VortexLattice), mesh);
    db.components.wings.push(ComponentEntry::new(1, "W".repeat(300), 77));
    db.components.wings.push(ComponentEntry::new(2, "Tail", 78));

    let back = read_mesh(&mut BinaryReader::new(encode(&db, &[], false).as_slice())).unwrap();
    let wings = &back.components.wings;
    assert_eq!(wings[0].name.len(), 99);
    assert_eq!(wings[0].component_id, 77);
    assert_eq!(wings[1].id, 2);
    assert_eq!(wings[1].name, "Tail");
}

#[test]
fn huge_node_count_on_short_body_is_truncated() {
    let mesh = TriMesh::from_parts(
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ],
        &[[0, 1, 2]],
    );
    let db = LoadedAeroMesh::new(AdbHeader::new(FileVersion::V3, ModelType::Panel), mesh);
    let bytes = encode(&db, &[], false);

    // The node count is the fifth header int after the sentinel.
    let mut corrupt = bytes;
    corrupt[20..24].copy_from_slice(&i32::MAX.to_ne_bytes());
    match read_mesh(&mut BinaryReader::new(corrupt.as_slice())) {
        Err(AdbError::Truncated { section, .. }) => assert_eq!(section, "nodes"),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn unknown_sentinel_is_version_mismatch() {
    let mut writer = BinaryWriter::new(Vec::new());
    writer.write(12_345_i32).unwrap();
    let bytes = writer.into_inner();
    assert!(matches!(
        read_mesh(&mut BinaryReader::new(bytes.as_slice())),
        Err(AdbError::FormatVersionMismatch { found: 12_345 })
    ));
}

#[test]
fn swapped_v2_and_v3_fixtures_load() {
    for version in [FileVersion::V2, FileVersion::V3] {
        let mesh = TriMesh::from_parts(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
            ],
            &[[0, 1, 2]],
        );
        let mut db = LoadedAeroMesh::new(AdbHeader::new(version, ModelType::Panel), mesh);
        db.propulsion.rotors.push([1.5; 11]);
        if version == FileVersion::V3 {
            db.propulsion.nozzles.push([2.5; 7]);
        }
        let case = SolutionCase {
            index: 1,
            mach: 0.5,
            cp: vec![-0.75],
            cp_unsteady: vec![0.0],
            gamma: vec![0.0],
            ..SolutionCase::default()
        };
        let bytes = encode(&db, std::slice::from_ref(&case), true);
        let entries = vec![CaseListEntry::new(0.5, 0.0, 0.0, "swapped")];
        let mut file = AdbFile::from_reader(Cursor::new(bytes), entries).unwrap();
        assert_eq!(file.mesh(), &db);
        let back = file.next_case().unwrap().unwrap();
        assert_eq!(back.cp, vec![-0.75]);
        assert_eq!(back.comment, "swapped");
        assert!(file.next_case().unwrap().is_none());
    }
}
