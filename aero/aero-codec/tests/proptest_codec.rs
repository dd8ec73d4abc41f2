//! Property-based round-trip tests for the binary codec.
//!
//! Run with: cargo test -p aero-codec -- proptest

use aero_codec::{BinaryReader, BinaryWriter};
use proptest::prelude::*;

/// Mixed record shaped like one triangle entry of the database.
fn arb_record() -> impl Strategy<Value = ([i32; 5], f32, [f64; 3])> {
    (
        prop::array::uniform5(any::<i32>()),
        any::<f32>().prop_filter("finite", |v| v.is_finite()),
        prop::array::uniform3(-1.0e9..1.0e9f64),
    )
}

fn encode(records: &[([i32; 5], f32, [f64; 3])], swap: bool) -> Vec<u8> {
    let mut writer = BinaryWriter::new(Vec::new());
    writer.set_swap(swap);
    for (ints, area, xyz) in records {
        writer.write_all(ints).unwrap();
        writer.write(*area).unwrap();
        writer.write_all(xyz).unwrap();
    }
    writer.into_inner()
}

proptest! {
    #[test]
    fn proptest_roundtrip_both_orders(
        records in prop::collection::vec(arb_record(), 0..40),
        swap in any::<bool>(),
    ) {
        let bytes = encode(&records, swap);
        prop_assert_eq!(bytes.len(), records.len() * (5 * 4 + 4 + 3 * 8));

        let mut reader = BinaryReader::new(bytes.as_slice());
        reader.set_swap(swap);
        for (ints, area, xyz) in &records {
            let got_ints: [i32; 5] = reader.read_array().unwrap();
            let got_area: f32 = reader.read().unwrap();
            let got_xyz: [f64; 3] = reader.read_array().unwrap();
            prop_assert_eq!(&got_ints, ints);
            prop_assert_eq!(got_area.to_bits(), area.to_bits());
            prop_assert_eq!(got_xyz, *xyz);
        }
        let mut tail = [0_i32; 1];
        prop_assert_eq!(reader.read_into(&mut tail).unwrap(), 0);
    }

    #[test]
    fn proptest_mismatched_order_differs(value in any::<i32>().prop_filter("not palindromic", |v| v.swap_bytes() != *v)) {
        let mut writer = BinaryWriter::new(Vec::new());
        writer.write(value).unwrap();
        let bytes = writer.into_inner();

        let mut reader = BinaryReader::new(bytes.as_slice());
        reader.toggle_swap();
        prop_assert_eq!(reader.read::<i32>().unwrap(), value.swap_bytes());
    }
}
