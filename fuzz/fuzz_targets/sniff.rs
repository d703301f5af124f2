#![no_main]

use std::io::Read;

use libfuzzer_sys::fuzz_target;
use msgcvt_driver::sniff::{replay, sniff, Sniffed};

// Fuzz target: sniffing never loses bytes.
//
// Whatever the classification, the consumed prefix followed by the rest
// of the stream must reproduce the input.
fuzz_target!(|data: &[u8]| {
    let Ok(sniffed) = sniff(data) else {
        return;
    };
    let mut out = Vec::new();
    match sniffed {
        Sniffed::Empty => {}
        Sniffed::Opaque { prefix, rest } => {
            replay(prefix, rest).read_to_end(&mut out).unwrap();
        }
        Sniffed::Container { prefix, rest, .. } => {
            replay(prefix, rest).read_to_end(&mut out).unwrap();
        }
    }
    assert_eq!(out, data);
});
