use std::fmt;

use crate::error::WireError;

/// First byte of every AvroX container.
pub const MARKER: u8 = 0x93;

/// Total magic/header size in bytes (fixed).
///
/// Sniffers read exactly this many bytes before deciding whether a stream
/// is a container, so nothing past the header is ever consumed while
/// probing.
pub const MAGIC_LEN: usize = 8;

/// Largest namespace id that fits the 21-bit namespace field.
pub const MAX_NAMESPACE_ID: u32 = (1 << 21) - 1;

/// Largest schema id that fits the 24-bit schema field.
pub const MAX_SCHEMA_ID: u32 = (1 << 24) - 1;

/// Semantic domain of a container payload.
///
/// Namespace `1` is reserved for the built-in basic scalars; every other
/// value names a family of schema-described records.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NamespaceId(u32);

impl NamespaceId {
    /// Built-in basic scalar values (string, bytes, int, ...).
    pub const BASIC: Self = Self(1);

    /// Create a namespace id, rejecting values wider than 21 bits.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::NamespaceOutOfRange`] if `id > MAX_NAMESPACE_ID`.
    pub fn new(id: u32) -> Result<Self, WireError> {
        if id > MAX_NAMESPACE_ID {
            return Err(WireError::NamespaceOutOfRange { id });
        }
        Ok(Self(id))
    }

    pub fn raw(self) -> u32 {
        self.0
    }

    pub fn is_basic(self) -> bool {
        self == Self::BASIC
    }
}

impl fmt::Display for NamespaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Schema identity within a namespace.
///
/// The 24-bit id splits into a 16-bit major component (`id >> 8`) and an
/// 8-bit minor component (`id & 0xFF`). Display prints `major.minor`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SchemaId(u32);

impl SchemaId {
    /// Create a schema id from its combined value.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::SchemaOutOfRange`] if `id > MAX_SCHEMA_ID`.
    pub fn new(id: u32) -> Result<Self, WireError> {
        if id > MAX_SCHEMA_ID {
            return Err(WireError::SchemaOutOfRange { id });
        }
        Ok(Self(id))
    }

    /// Build a schema id from its major/minor pair. Always in range.
    pub fn from_parts(major: u16, minor: u8) -> Self {
        Self((u32::from(major) << 8) | u32::from(minor))
    }

    pub fn raw(self) -> u32 {
        self.0
    }

    pub fn major(self) -> u16 {
        let [_, hi, lo, _] = self.0.to_be_bytes();
        u16::from_be_bytes([hi, lo])
    }

    pub fn minor(self) -> u8 {
        self.0.to_be_bytes()[3]
    }
}

impl fmt::Display for SchemaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major(), self.minor())
    }
}

/// Payload compression applied to everything after the header.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Compression {
    #[default]
    None = 0,
    /// Snappy block format (no framing).
    Snappy = 1,
    /// Raw DEFLATE, no zlib wrapper.
    Flate = 2,
    Gzip = 3,
}

impl Compression {
    /// Map a wire id to a compression kind.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::UnknownCompression`] for ids outside `0..=3`.
    pub fn from_id(id: u8) -> Result<Self, WireError> {
        match id {
            0 => Ok(Self::None),
            1 => Ok(Self::Snappy),
            2 => Ok(Self::Flate),
            3 => Ok(Self::Gzip),
            _ => Err(WireError::UnknownCompression { id }),
        }
    }

    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Snappy => "snappy",
            Self::Flate => "flate",
            Self::Gzip => "gzip",
        }
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// AvroX container header: the first 8 bytes of every container.
///
/// ```text
/// ┌────────┬──────────┬───────────────────────────────────────────────┐
/// │ Offset │ Size     │ Description                                   │
/// ├────────┼──────────┼───────────────────────────────────────────────┤
/// │ 0x00   │ 1 byte   │ Marker 0x93                                   │
/// │ 0x01   │ 3 bits   │ Compression id (bits 7..5)                    │
/// │ 0x01   │ 21 bits  │ Namespace id, big-endian (through 0x03)       │
/// │ 0x04   │ 3 bytes  │ Schema id, big-endian (major.minor = 16.8)    │
/// │ 0x07   │ 1 byte   │ Checksum: bytes 0x01..=0x07 sum to 0 mod 256  │
/// └────────┴──────────┴───────────────────────────────────────────────┘
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AvroxHeader {
    pub namespace: NamespaceId,
    pub schema: SchemaId,
    pub compression: Compression,
}

impl AvroxHeader {
    pub fn new(namespace: NamespaceId, schema: SchemaId, compression: Compression) -> Self {
        Self {
            namespace,
            schema,
            compression,
        }
    }

    /// Header for a value in the BASIC namespace.
    pub fn basic(schema: SchemaId, compression: Compression) -> Self {
        Self::new(NamespaceId::BASIC, schema, compression)
    }

    /// Write the 8-byte header into the provided buffer.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::UnexpectedEof`] if `buf` is shorter than
    /// [`MAGIC_LEN`] (8 bytes).
    pub fn write_to(&self, buf: &mut [u8]) -> Result<(), WireError> {
        if buf.len() < MAGIC_LEN {
            return Err(WireError::UnexpectedEof { offset: buf.len() });
        }
        buf[..MAGIC_LEN].copy_from_slice(&self.to_bytes());
        Ok(())
    }

    /// Serialize the header into its fixed 8-byte form.
    pub fn to_bytes(&self) -> [u8; MAGIC_LEN] {
        let [_, ns_hi, ns_mid, ns_lo] = self.namespace.raw().to_be_bytes();
        let [_, s_hi, s_mid, s_lo] = self.schema.raw().to_be_bytes();

        let mut magic = [0u8; MAGIC_LEN];
        magic[0] = MARKER;
        magic[1] = (self.compression.id() << 5) | (ns_hi & 0x1F);
        magic[2] = ns_mid;
        magic[3] = ns_lo;
        magic[4] = s_hi;
        magic[5] = s_mid;
        magic[6] = s_lo;
        magic[7] = checksum(&magic[1..7]);
        magic
    }

    /// Parse a header from the first 8 bytes of the provided buffer.
    ///
    /// Validation order: length, marker, checksum, compression id. A buffer
    /// that passes [`is_magic`] can only fail here on the compression id.
    ///
    /// # Errors
    ///
    /// - [`WireError::UnexpectedEof`] if the buffer is too short.
    /// - [`WireError::InvalidMarker`] if byte 0 is not [`MARKER`].
    /// - [`WireError::ChecksumMismatch`] if byte 7 does not balance bytes 1..=6.
    /// - [`WireError::UnknownCompression`] if the 3-bit compression id is unassigned.
    pub fn read_from(buf: &[u8]) -> Result<Self, WireError> {
        if buf.len() < MAGIC_LEN {
            return Err(WireError::UnexpectedEof { offset: buf.len() });
        }
        if buf[0] != MARKER {
            return Err(WireError::InvalidMarker { found: buf[0] });
        }
        let expected = checksum(&buf[1..7]);
        if buf[7] != expected {
            return Err(WireError::ChecksumMismatch {
                expected,
                found: buf[7],
            });
        }

        let compression = Compression::from_id(buf[1] >> 5)?;
        let namespace = NamespaceId(u32::from_be_bytes([0, buf[1] & 0x1F, buf[2], buf[3]]));
        let schema = SchemaId(u32::from_be_bytes([0, buf[4], buf[5], buf[6]]));

        Ok(Self {
            namespace,
            schema,
            compression,
        })
    }

    /// Registry key `namespace.major.minor` used to look up AVSC schemas.
    pub fn schema_key(&self) -> String {
        format!("{}.{}", self.namespace, self.schema)
    }
}

impl fmt::Display for AvroxHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "N: {} / S: {} / C: {}",
            self.namespace,
            self.schema,
            self.compression.id()
        )
    }
}

/// Cheap sniffing predicate: marker byte plus a balanced checksum.
///
/// Never looks past the first [`MAGIC_LEN`] bytes.
pub fn is_magic(buf: &[u8]) -> bool {
    buf.len() >= MAGIC_LEN && buf[0] == MARKER && checksum(&buf[1..7]) == buf[7]
}

fn checksum(bytes: &[u8]) -> u8 {
    bytes
        .iter()
        .fold(0u8, |acc, &b| acc.wrapping_add(b))
        .wrapping_neg()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn basic(minor: u8) -> AvroxHeader {
        AvroxHeader::basic(SchemaId::from_parts(0, minor), Compression::None)
    }

    #[test]
    fn basic_string_header_bytes() {
        assert_eq!(
            basic(1).to_bytes(),
            [0x93, 0x00, 0x00, 0x01, 0x00, 0x00, 0x01, 0xFE]
        );
    }

    #[test]
    fn basic_decimal_header_bytes() {
        assert_eq!(
            basic(6).to_bytes(),
            [0x93, 0x00, 0x00, 0x01, 0x00, 0x00, 0x06, 0xF9]
        );
    }

    #[test]
    fn roundtrip_with_compression() {
        let header = AvroxHeader::new(
            NamespaceId::new(0x1F_ABCD).unwrap(),
            SchemaId::from_parts(0x0102, 0x03),
            Compression::Gzip,
        );
        let mut buf = [0u8; MAGIC_LEN];
        header.write_to(&mut buf).unwrap();
        assert!(is_magic(&buf));
        assert_eq!(AvroxHeader::read_from(&buf).unwrap(), header);
    }

    #[test]
    fn display_shows_triple() {
        let header = AvroxHeader::new(
            NamespaceId::new(7).unwrap(),
            SchemaId::from_parts(1, 2),
            Compression::Snappy,
        );
        assert_eq!(header.to_string(), "N: 7 / S: 1.2 / C: 1");
        assert_eq!(header.schema_key(), "7.1.2");
    }

    #[test]
    fn reject_bad_marker() {
        let mut buf = basic(1).to_bytes();
        buf[0] = 0x92;
        assert!(!is_magic(&buf));
        assert!(matches!(
            AvroxHeader::read_from(&buf),
            Err(WireError::InvalidMarker { found: 0x92 })
        ));
    }

    #[test]
    fn reject_bad_checksum() {
        let mut buf = basic(1).to_bytes();
        buf[7] = 0x00;
        assert!(!is_magic(&buf));
        assert!(matches!(
            AvroxHeader::read_from(&buf),
            Err(WireError::ChecksumMismatch {
                expected: 0xFE,
                found: 0x00
            })
        ));
    }

    #[test]
    fn magic_with_unassigned_compression_fails_decode() {
        // compression id 5, checksum rebalanced so the sniffer accepts it
        let mut buf = [0x93, 0b1010_0000, 0x00, 0x01, 0x00, 0x00, 0x01, 0x00];
        buf[7] = checksum(&buf[1..7]);
        assert!(is_magic(&buf));
        assert!(matches!(
            AvroxHeader::read_from(&buf),
            Err(WireError::UnknownCompression { id: 5 })
        ));
    }

    #[test]
    fn reject_buffer_too_short() {
        let buf = [0x93, 0x00, 0x00, 0x01];
        assert!(!is_magic(&buf));
        assert!(matches!(
            AvroxHeader::read_from(&buf),
            Err(WireError::UnexpectedEof { offset: 4 })
        ));
    }

    #[test]
    fn out_of_range_ids_rejected() {
        assert!(matches!(
            NamespaceId::new(MAX_NAMESPACE_ID + 1),
            Err(WireError::NamespaceOutOfRange { .. })
        ));
        assert!(matches!(
            SchemaId::new(MAX_SCHEMA_ID + 1),
            Err(WireError::SchemaOutOfRange { .. })
        ));
    }

    #[test]
    fn compression_ids_are_stable() {
        for (id, kind) in [
            (0, Compression::None),
            (1, Compression::Snappy),
            (2, Compression::Flate),
            (3, Compression::Gzip),
        ] {
            assert_eq!(Compression::from_id(id).unwrap(), kind);
            assert_eq!(kind.id(), id);
        }
    }

    proptest! {
        #[test]
        fn prop_schema_parts_recovered(major in any::<u16>(), minor in any::<u8>()) {
            let schema = SchemaId::from_parts(major, minor);
            prop_assert_eq!(schema.raw(), (u32::from(major) << 8) | u32::from(minor));
            prop_assert_eq!(schema.major(), major);
            prop_assert_eq!(schema.minor(), minor);
        }

        #[test]
        fn prop_header_roundtrip(
            ns in 0..=MAX_NAMESPACE_ID,
            major in any::<u16>(),
            minor in any::<u8>(),
            cid in 0u8..=3,
        ) {
            let header = AvroxHeader::new(
                NamespaceId::new(ns).unwrap(),
                SchemaId::from_parts(major, minor),
                Compression::from_id(cid).unwrap(),
            );
            let bytes = header.to_bytes();
            prop_assert!(is_magic(&bytes));
            let parsed = AvroxHeader::read_from(&bytes).unwrap();
            prop_assert_eq!(parsed, header);
            prop_assert_eq!(parsed.schema.major(), major);
            prop_assert_eq!(parsed.schema.minor(), minor);
        }

        #[test]
        fn prop_single_bit_flip_breaks_magic(bit in 8usize..64) {
            let mut bytes = basic(1).to_bytes();
            bytes[bit / 8] ^= 1 << (bit % 8);
            prop_assert!(!is_magic(&bytes));
        }
    }
}
