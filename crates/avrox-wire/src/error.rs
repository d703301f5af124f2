/// Errors raised while reading or writing an AvroX header.
///
/// ```text
///   WireError
///   ├── UnexpectedEof        ← input shorter than the 8-byte magic
///   ├── InvalidMarker        ← first byte is not 0x93
///   ├── ChecksumMismatch     ← header bytes 1..=7 do not sum to zero
///   ├── UnknownCompression   ← compression id outside {0,1,2,3}
///   ├── NamespaceOutOfRange  ← namespace id wider than 21 bits
///   └── SchemaOutOfRange     ← schema id wider than 24 bits
/// ```
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// Input ended before a complete header could be read.
    #[error("unexpected end of input at offset {offset}")]
    UnexpectedEof { offset: usize },

    #[error("invalid marker byte: expected 0x93, got {found:#04X}")]
    InvalidMarker { found: u8 },

    /// The trailing checksum byte does not balance bytes 1..=6.
    #[error("header checksum mismatch: expected {expected:#04X}, got {found:#04X}")]
    ChecksumMismatch { expected: u8, found: u8 },

    #[error("unknown compression id {id}")]
    UnknownCompression { id: u8 },

    #[error("namespace id {id} exceeds 21 bits")]
    NamespaceOutOfRange { id: u32 },

    #[error("schema id {id} exceeds 24 bits")]
    SchemaOutOfRange { id: u32 },
}
