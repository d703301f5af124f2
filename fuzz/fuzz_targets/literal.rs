#![no_main]

use arbitrary::Arbitrary;
use avrox_basic::{LiteralKind, LiteralOptions};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct Input {
    kind: u8,
    unquote: bool,
    strip_lf: bool,
    text: Vec<u8>,
}

// Fuzz target: literal parsing (unquote, strip-LF, type conversion).
//
// Parsing may fail but must not panic, and every parsed value must
// survive an uncompressed encode/decode cycle.
fuzz_target!(|input: Input| {
    let kind = match input.kind % 5 {
        0 => LiteralKind::String,
        1 => LiteralKind::Bytes,
        2 => LiteralKind::Int,
        3 => LiteralKind::Decimal,
        _ => LiteralKind::RawDate,
    };
    let options = LiteralOptions {
        unquote: input.unquote,
        strip_lf: input.strip_lf,
    };
    let Ok(value) = avrox_basic::parse_literal(kind, &input.text, options) else {
        return;
    };
    let container =
        avrox_basic::encode_basic(&value, avrox_wire::Compression::None).unwrap();
    assert!(avrox_basic::decode_basic(&container).is_ok());
});
