use apache_avro::Schema;
use avrox_basic::{LiteralKind, LiteralOptions};
use avrox_wire::Compression;

use crate::schema_registry::SchemaRegistry;

/// Input decompression applied before any sniffing or decoding.
///
/// At most one strategy is active per invocation. When several are
/// requested at once, [`from_flags`](Self::from_flags) resolves them by
/// strict precedence:
///
/// ```text
/// ┌──────────────┬──────────┬────────────────────────────────────────────┐
/// │ Strategy     │ Priority │ Behaviour                                  │
/// ├──────────────┼──────────┼────────────────────────────────────────────┤
/// │ SnappyBlock  │ 1        │ Read all, decode atomically, fall back to  │
/// │              │          │ the original bytes when decoding fails     │
/// │ SnappyStream │ 2        │ Lazy snappy frame decoder                  │
/// │ Gzip         │ 3        │ Lazy gzip decoder, header checked upfront  │
/// │ Deflate      │ 4        │ Lazy raw DEFLATE decoder                   │
/// └──────────────┴──────────┴────────────────────────────────────────────┘
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Decompression {
    #[default]
    None,
    SnappyBlock,
    SnappyStream,
    Gzip,
    Deflate,
}

impl Decompression {
    pub fn from_flags(snappy_block: bool, snappy_stream: bool, gzip: bool, deflate: bool) -> Self {
        if snappy_block {
            Self::SnappyBlock
        } else if snappy_stream {
            Self::SnappyStream
        } else if gzip {
            Self::Gzip
        } else if deflate {
            Self::Deflate
        } else {
            Self::None
        }
    }
}

/// Decoders that turn a whole input stream into JSON.
#[derive(Clone, Debug)]
pub enum JsonSource {
    Cbor,
    Gob,
    /// Avro binary datum described by the given schema.
    Avro(Schema),
}

/// How `translate` renders its output.
///
/// `Raw`, `Quote` and `Hex` take part in AvroX detection; `HexDump` and
/// `Json` always treat the input as opaque.
#[derive(Clone, Debug)]
pub enum RenderMode {
    /// Pass bytes through. With `ensure_lf`, output that does not already
    /// end in `\n` gets exactly one appended.
    Raw { ensure_lf: bool },
    /// Double-quoted escaped literal, followed by `\n`.
    Quote,
    /// Lowercase hex, followed by `\n`.
    Hex,
    /// Canonical 16-column hex dump.
    HexDump,
    /// Pretty-printed JSON.
    Json(JsonSource),
}

impl RenderMode {
    fn detects_avrox(&self) -> bool {
        matches!(self, Self::Raw { .. } | Self::Quote | Self::Hex)
    }
}

/// Configuration for [`translate`](crate::translate).
///
/// ```text
/// ┌────────────────┬──────────────────────────────────────────────────────┐
/// │ Field          │ Purpose                                              │
/// ├────────────────┼──────────────────────────────────────────────────────┤
/// │ decompression  │ Input decompression strategy                         │
/// │ mode           │ Output rendering                                     │
/// │ detect_avrox   │ Sniff for AvroX containers (raw / quote / hex only)  │
/// │ detect_basics  │ Decode BASIC containers into their scalar value      │
/// │ decimal_float  │ Render decimals as the nearest f64                   │
/// │ registry       │ AVSC schemas for non-basic containers                │
/// └────────────────┴──────────────────────────────────────────────────────┘
/// ```
#[derive(Clone, Debug)]
pub struct TranslateConfig {
    pub decompression: Decompression,
    pub mode: RenderMode,
    pub detect_avrox: bool,
    pub detect_basics: bool,
    pub decimal_float: bool,
    pub registry: SchemaRegistry,
}

impl TranslateConfig {
    /// Whether this configuration sniffs the input at all.
    pub fn sniffs(&self) -> bool {
        self.detect_avrox && self.mode.detects_avrox()
    }
}

impl Default for TranslateConfig {
    /// Raw pass-through with container and basic detection enabled.
    fn default() -> Self {
        Self {
            decompression: Decompression::None,
            mode: RenderMode::Raw { ensure_lf: false },
            detect_avrox: true,
            detect_basics: true,
            decimal_float: false,
            registry: SchemaRegistry::default(),
        }
    }
}

/// Configuration for [`analyse`](crate::analyse).
#[derive(Clone, Copy, Debug, Default)]
pub struct AnalyseConfig {
    pub decompression: Decompression,
    /// Emit the stream quoted instead of unchanged.
    pub quote: bool,
}

/// Configuration for [`encode`](crate::encode).
#[derive(Clone, Copy, Debug)]
pub struct EncodeConfig {
    pub decompression: Decompression,
    pub kind: LiteralKind,
    pub options: LiteralOptions,
    pub compression: Compression,
    /// Emit the container quoted instead of as raw bytes.
    pub quote: bool,
}

impl EncodeConfig {
    /// Plain, uncompressed encoding of the given kind.
    pub fn new(kind: LiteralKind) -> Self {
        Self {
            decompression: Decompression::None,
            kind,
            options: LiteralOptions::default(),
            compression: Compression::None,
            quote: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decompression_precedence() {
        assert_eq!(
            Decompression::from_flags(true, true, true, true),
            Decompression::SnappyBlock
        );
        assert_eq!(
            Decompression::from_flags(false, true, true, true),
            Decompression::SnappyStream
        );
        assert_eq!(
            Decompression::from_flags(false, false, true, true),
            Decompression::Gzip
        );
        assert_eq!(
            Decompression::from_flags(false, false, false, true),
            Decompression::Deflate
        );
        assert_eq!(
            Decompression::from_flags(false, false, false, false),
            Decompression::None
        );
    }

    #[test]
    fn only_text_modes_sniff() {
        let mut config = TranslateConfig::default();
        assert!(config.sniffs());
        config.mode = RenderMode::HexDump;
        assert!(!config.sniffs());
        config.mode = RenderMode::Hex;
        config.detect_avrox = false;
        assert!(!config.sniffs());
    }
}
