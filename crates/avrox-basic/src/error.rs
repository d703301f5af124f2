use avrox_wire::{AvroxHeader, WireError};

use crate::value::BasicKind;

/// Errors from the payload compression wrapper.
#[derive(Debug, thiserror::Error)]
pub enum CompressionError {
    #[error("{codec} compression failed: {reason}")]
    CompressFailed { codec: &'static str, reason: String },

    /// The body could not be decoded with the codec named in the header.
    /// Common causes: truncated input, corrupt frame, or a wrong
    /// compression id.
    #[error("{codec} decompression failed: {reason}")]
    DecompressFailed { codec: &'static str, reason: String },

    /// Prevents decompression bombs; `limit` defaults to
    /// [`MAX_BODY_SIZE`](crate::compression::MAX_BODY_SIZE).
    #[error("decompressed size {actual} exceeds limit {limit}")]
    DecompressionBomb { actual: usize, limit: usize },
}

/// Errors that can occur while encoding a basic value into a container.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    /// The value does not validate against its basic schema.
    #[error("avro encoding failed: {0}")]
    Avro(#[from] apache_avro::Error),

    #[error(transparent)]
    Compression(#[from] CompressionError),
}

/// Structural problems inside an (already decompressed) basic body.
#[derive(Debug, thiserror::Error)]
pub enum BodyError {
    #[error(transparent)]
    Avro(#[from] apache_avro::Error),

    #[error("{kind} body ends before its value")]
    Truncated { kind: BasicKind },

    #[error("unexpected data after value ({extra_bytes} bytes)")]
    TrailingData { extra_bytes: usize },

    #[error("date {days} days from epoch is out of range")]
    DateOutOfRange { days: i32 },

    #[error("timestamp {micros}µs from epoch is out of range")]
    TimeOutOfRange { micros: i64 },
}

/// Errors that can occur while decoding a basic container.
///
/// Every variant past the header stage carries the decoded header so the
/// caller can print the namespace / schema / compression triple.
///
/// ```text
///   DecodeError
///   ├── InvalidHeader(WireError)   ← marker, checksum or compression id wrong
///   ├── NotBasic                   ← namespace is not BASIC
///   ├── Decompress                 ← body codec failed or bomb guard tripped
///   └── Malformed                  ← body does not match the schema's shape
/// ```
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("invalid header: {0}")]
    InvalidHeader(WireError),

    #[error("AvroX({header}) is not in the basic namespace")]
    NotBasic { header: AvroxHeader },

    #[error("AvroX({header}): {source}")]
    Decompress {
        header: AvroxHeader,
        #[source]
        source: CompressionError,
    },

    #[error("malformed AvroX({header}) body: {source}")]
    Malformed {
        header: AvroxHeader,
        #[source]
        source: BodyError,
    },
}

impl DecodeError {
    /// The decoded header, when decoding got that far.
    pub fn header(&self) -> Option<&AvroxHeader> {
        match self {
            Self::InvalidHeader(_) => None,
            Self::NotBasic { header }
            | Self::Decompress { header, .. }
            | Self::Malformed { header, .. } => Some(header),
        }
    }
}

/// Errors raised while turning literal command input into a basic value.
#[derive(Debug, thiserror::Error)]
pub enum LiteralError {
    /// String-literal unescaping failed. `offset` indexes the quoted text.
    #[error("cannot unquote input at offset {offset}: {reason}")]
    Unquote { offset: usize, reason: &'static str },

    #[error("input is not valid UTF-8")]
    InvalidUtf8,

    #[error("cannot read {input:?} as int: {source}")]
    InvalidInteger {
        input: String,
        #[source]
        source: std::num::ParseIntError,
    },

    #[error("cannot read {input:?} as ISO date: {source}")]
    InvalidDate {
        input: String,
        #[source]
        source: chrono::ParseError,
    },
}
