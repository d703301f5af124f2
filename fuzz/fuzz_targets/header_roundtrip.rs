#![no_main]

use avrox_wire::{AvroxHeader, Compression, NamespaceId, SchemaId};
use libfuzzer_sys::fuzz_target;

// Fuzz target: AvroxHeader write->read roundtrip.
//
// Input format:
//   bytes 0..3: namespace id (masked to 21 bits)
//   bytes 3..5: schema major
//   byte  5:    schema minor
//   byte  6:    compression id (mod 4)
fuzz_target!(|data: &[u8]| {
    if data.len() < 7 {
        return;
    }
    let ns = u32::from_be_bytes([0, data[0], data[1], data[2]]) & 0x1F_FFFF;
    let schema = SchemaId::from_parts(u16::from_be_bytes([data[3], data[4]]), data[5]);
    let compression = Compression::from_id(data[6] % 4).unwrap();
    let header = AvroxHeader::new(NamespaceId::new(ns).unwrap(), schema, compression);

    let bytes = header.to_bytes();
    assert!(avrox_wire::is_magic(&bytes));
    let parsed = AvroxHeader::read_from(&bytes).unwrap();
    assert_eq!(parsed, header);
    assert_eq!(parsed.schema.major(), schema.major());
    assert_eq!(parsed.schema.minor(), schema.minor());
});
