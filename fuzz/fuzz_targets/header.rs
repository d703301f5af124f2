#![no_main]

use libfuzzer_sys::fuzz_target;

// Fuzz target: AvroxHeader::read_from and the is_magic predicate.
//
// A prefix accepted by read_from must also satisfy is_magic and
// re-serialize to the same eight bytes.
fuzz_target!(|data: &[u8]| {
    if let Ok(header) = avrox_wire::AvroxHeader::read_from(data) {
        assert!(avrox_wire::is_magic(data));
        assert_eq!(&header.to_bytes()[..], &data[..avrox_wire::MAGIC_LEN]);
    }
});
