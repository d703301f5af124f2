#![no_main]

use libfuzzer_sys::fuzz_target;

// Fuzz target: full basic container decode.
//
// Catches bugs in:
// - Body decompression and the size guard
// - Map block counts (negative, huge)
// - Decimal unions and out-of-range dates
// A decoded value must survive re-encoding. Values are compared as Debug
// text since maps may carry NaN doubles and have no wire order.
fuzz_target!(|data: &[u8]| {
    let Ok(decoded) = avrox_basic::decode_basic(data) else {
        return;
    };
    let again = avrox_basic::encode_basic(&decoded.value, decoded.header.compression).unwrap();
    let reparsed = avrox_basic::decode_basic(&again).unwrap();
    assert_eq!(format!("{:?}", reparsed.value), format!("{:?}", decoded.value));
});
