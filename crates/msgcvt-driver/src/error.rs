use std::path::PathBuf;

use avrox_basic::{CompressionError, EncodeError, LiteralError};
use avrox_wire::WireError;

/// Errors that can occur while running a conversion pipeline.
///
/// Undecodable basic bodies are not errors at this level: they degrade to an
/// `UndecodableBasic` [`Finding`](crate::Finding) instead of failing.
///
/// ```text
/// ┌────────────────────┬────────────────────────────────────────────────────┐
/// │ Variant            │ Cause                                              │
/// ├────────────────────┼────────────────────────────────────────────────────┤
/// │ Io                 │ Reading input or writing output failed             │
/// │ InconsistentHeader │ Magic matched but the header fields do not decode  │
/// │ Decompress         │ Streaming codec could not start or continue        │
/// │ Compression        │ Container body codec failed                        │
/// │ Literal            │ Literal text could not be turned into a value      │
/// │ Encode             │ Container encoding (compression) failed            │
/// │ Cbor               │ CBOR input could not be decoded                    │
/// │ Avro               │ AVSC parse or Avro-by-schema decode failed         │
/// │ Json               │ JSON serialisation failed                          │
/// │ NonStringKey       │ Map key cannot be represented as a JSON string     │
/// │ Unsupported        │ Input format has no decoder in this build          │
/// │ SchemaPath         │ An `--avsc` path or schema file is unreadable      │
/// └────────────────────┴────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("magic matched but header is inconsistent: {0}")]
    InconsistentHeader(#[source] WireError),

    #[error("{codec} decompression failed: {source}")]
    Decompress {
        codec: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Compression(#[from] CompressionError),

    #[error(transparent)]
    Literal(#[from] LiteralError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error("cannot decode CBOR: {0}")]
    Cbor(String),

    #[error("avro: {0}")]
    Avro(#[from] apache_avro::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("cannot convert map key {key} to string")]
    NonStringKey { key: String },

    #[error("{format} decoding is not supported")]
    Unsupported { format: &'static str },

    #[error("cannot read {}: {source}", path.display())]
    SchemaPath {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
