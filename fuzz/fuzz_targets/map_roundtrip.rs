#![no_main]

use std::collections::BTreeMap;

use arbitrary::Arbitrary;
use avrox_basic::{BasicValue, MapValue};
use avrox_wire::Compression;
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
enum Slot {
    Null,
    Bool(bool),
    Long(i64),
    Double(f64),
    String(String),
    Bytes(Vec<u8>),
}

#[derive(Arbitrary, Debug)]
struct Input {
    codec: u8,
    entries: Vec<(String, Slot)>,
}

// Fuzz target: basic map encode->decode roundtrip.
//
// Map entries are unordered on the wire, so values are compared after
// decoding. Debug text is compared because doubles may be NaN.
fuzz_target!(|input: Input| {
    let compression = match input.codec % 4 {
        0 => Compression::None,
        1 => Compression::Snappy,
        2 => Compression::Flate,
        _ => Compression::Gzip,
    };
    let map: BTreeMap<String, MapValue> = input
        .entries
        .into_iter()
        .map(|(key, slot)| {
            let value = match slot {
                Slot::Null => MapValue::Null,
                Slot::Bool(b) => MapValue::Bool(b),
                Slot::Long(i) => MapValue::Long(i),
                Slot::Double(d) => MapValue::Double(d),
                Slot::String(s) => MapValue::String(s),
                Slot::Bytes(b) => MapValue::Bytes(b),
            };
            (key, value)
        })
        .collect();
    let value = BasicValue::Map(map);

    let container = avrox_basic::encode_basic(&value, compression).unwrap();
    let decoded = avrox_basic::decode_basic(&container).unwrap();
    assert_eq!(format!("{:?}", decoded.value), format!("{value:?}"));
});
