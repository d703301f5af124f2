use std::io::{self, Read, Write};

use avrox_basic::compression::{self, MAX_BODY_SIZE};
use avrox_basic::{BasicValue, decode_basic, encode_basic, parse_literal};
use avrox_wire::{AvroxHeader, MAGIC_LEN};

use crate::config::{AnalyseConfig, EncodeConfig, RenderMode, TranslateConfig};
use crate::decompress;
use crate::error::DriverError;
use crate::finding::Finding;
use crate::hexdump::HexDumper;
use crate::json::{AvroDecoder, JsonDecoder, write_pretty};
use crate::render;
use crate::schema_registry::SchemaRegistry;
use crate::sniff::{Sniffed, replay, sniff};

/// Render `input` to `out` as configured and report the finding on `diag`.
///
/// ```text
/// input ──▶ decompress ──▶ sniff ──┬─ empty ──────────▶ (nothing)
///                                  ├─ opaque ─────────▶ raw / quote / hex
///                                  ├─ basic ──▶ decode ▶ canonical text ▶ raw / quote / hex
///                                  └─ container ──────▶ JSON if a schema is registered
/// ```
///
/// Hex-dump and JSON modes skip sniffing and treat the input as opaque.
/// A basic container whose body cannot be decoded is not an error: it is
/// reported as [`Finding::UndecodableBasic`] and nothing is written to `out`.
///
/// # Errors
///
/// - [`DriverError::Decompress`] / [`DriverError::Io`] from the input side.
/// - [`DriverError::InconsistentHeader`] when the magic matches but the
///   header does not decode.
/// - Decoder errors (`Cbor`, `Avro`, `NonStringKey`, `Unsupported`,
///   `Compression`) in JSON mode and for registered non-basic containers.
pub fn translate<R: Read, W: Write, D: Write>(
    input: R,
    config: &TranslateConfig,
    out: &mut W,
    diag: &mut D,
) -> Result<Finding, DriverError> {
    let mut input = decompress::wrap(input, config.decompression)?;
    let finding = match &config.mode {
        RenderMode::Raw { ensure_lf } => translate_text(
            input,
            TextMode::Raw {
                ensure_lf: *ensure_lf,
            },
            config,
            out,
        )?,
        RenderMode::Quote => {
            translate_text(input, TextMode::Quote { line_feed: true }, config, out)?
        }
        RenderMode::Hex => translate_text(input, TextMode::Hex, config, out)?,
        RenderMode::HexDump => {
            let mut dumper = HexDumper::new(&mut *out);
            let len = io::copy(&mut input, &mut dumper)?;
            dumper.finish()?;
            opaque(len)
        }
        RenderMode::Json(source) => {
            let mut counted = Counting::new(input);
            let value = source.decoder().decode(&mut counted)?;
            write_pretty(out, &value)?;
            opaque(counted.count)
        }
    };
    report(diag, &finding)?;
    Ok(finding)
}

/// Pass `input` through unchanged (or quoted) and report what it is.
///
/// # Errors
///
/// [`DriverError::Io`], [`DriverError::Decompress`] or
/// [`DriverError::InconsistentHeader`].
pub fn analyse<R: Read, W: Write, D: Write>(
    input: R,
    config: &AnalyseConfig,
    out: &mut W,
    diag: &mut D,
) -> Result<Finding, DriverError> {
    let input = decompress::wrap(input, config.decompression)?;
    let mode = if config.quote {
        TextMode::Quote { line_feed: false }
    } else {
        TextMode::Raw { ensure_lf: false }
    };
    let finding = match sniff(input)? {
        Sniffed::Empty => Finding::Empty,
        Sniffed::Opaque { prefix, rest } => render_opaque(replay(prefix, rest), mode, out)?,
        Sniffed::Container {
            header,
            prefix,
            rest,
        } => Finding::Container {
            len: render_stream(replay(prefix, rest), mode, out)?,
            header,
        },
    };
    report(diag, &finding)?;
    Ok(finding)
}

/// Wrap literal input into a basic AvroX container.
///
/// A decimal that does not parse writes `(defective)` to `diag` and is
/// encoded as the null placeholder.
///
/// # Errors
///
/// - [`DriverError::Literal`] for unquote, UTF-8, integer or date failures.
/// - [`DriverError::Encode`] if compressing the body fails.
/// - [`DriverError::Io`] / [`DriverError::Decompress`] from reading.
pub fn encode<R: Read, W: Write, D: Write>(
    input: R,
    config: &EncodeConfig,
    out: &mut W,
    diag: &mut D,
) -> Result<Finding, DriverError> {
    let mut input = decompress::wrap(input, config.decompression)?;
    let mut text = Vec::new();
    input.read_to_end(&mut text)?;

    let value = parse_literal(config.kind, &text, config.options)?;
    if matches!(value, BasicValue::Decimal(None)) {
        writeln!(diag, "(defective)")?;
    }
    let container = encode_basic(&value, config.compression)?;
    if config.quote {
        render::write_quoted(out, &container, false)?;
    } else {
        out.write_all(&container)?;
    }

    let finding = Finding::Encoded {
        len: container.len() as u64,
        header: AvroxHeader::basic(value.schema_id(), config.compression),
    };
    report(diag, &finding)?;
    Ok(finding)
}

// ── Text modes ─────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug)]
enum TextMode {
    Raw { ensure_lf: bool },
    Quote { line_feed: bool },
    Hex,
}

fn translate_text(
    input: impl Read,
    mode: TextMode,
    config: &TranslateConfig,
    out: &mut impl Write,
) -> Result<Finding, DriverError> {
    if !config.sniffs() {
        return render_opaque(input, mode, out);
    }
    match sniff(input)? {
        Sniffed::Empty => Ok(Finding::Empty),
        Sniffed::Opaque { prefix, rest } => render_opaque(replay(prefix, rest), mode, out),
        Sniffed::Container {
            header,
            prefix,
            mut rest,
        } => {
            let mut buf = prefix.to_vec();
            rest.read_to_end(&mut buf)?;
            tracing::debug!(%header, len = buf.len(), "container detected");
            if header.namespace.is_basic() && config.detect_basics {
                translate_basic(header, &buf, mode, config.decimal_float, out)
            } else {
                translate_container(header, &buf, &config.registry, out)
            }
        }
    }
}

fn translate_basic(
    header: AvroxHeader,
    buf: &[u8],
    mode: TextMode,
    decimal_float: bool,
    out: &mut impl Write,
) -> Result<Finding, DriverError> {
    let decoded = match decode_basic(buf) {
        Ok(decoded) => decoded,
        Err(e) => {
            let reason =
                std::error::Error::source(&e).map_or_else(|| e.to_string(), ToString::to_string);
            return Ok(Finding::UndecodableBasic {
                header: e.header().copied().unwrap_or(header),
                reason,
            });
        }
    };
    let text = render::canonical_text(&decoded.value, decimal_float)?;
    match (decoded.value.kind(), text) {
        (Some(kind), Some(text)) => {
            render_bytes(&text, mode, out)?;
            Ok(Finding::Basic {
                len: buf.len() as u64,
                header: decoded.header,
                kind,
            })
        }
        _ => Ok(Finding::UndecodableBasic {
            header: decoded.header,
            reason: format!("unknown basic schema {}", decoded.header.schema),
        }),
    }
}

fn translate_container(
    header: AvroxHeader,
    buf: &[u8],
    registry: &SchemaRegistry,
    out: &mut impl Write,
) -> Result<Finding, DriverError> {
    let finding = Finding::Container {
        len: buf.len() as u64,
        header,
    };
    let key = header.schema_key();
    let Some(schema) = registry.get(&key) else {
        tracing::debug!(%key, "no schema registered");
        return Ok(finding);
    };

    let body = compression::decompress(header.compression, &buf[MAGIC_LEN..], MAX_BODY_SIZE)?;
    let mut datum = buf[..MAGIC_LEN].to_vec();
    datum.extend_from_slice(&body);
    let value = AvroDecoder { schema }.decode(&mut datum.as_slice())?;
    write_pretty(out, &value)?;
    Ok(finding)
}

fn render_opaque(
    input: impl Read,
    mode: TextMode,
    out: &mut impl Write,
) -> Result<Finding, DriverError> {
    Ok(opaque(render_stream(input, mode, out)?))
}

/// Render a whole stream, returning its length. Empty streams write nothing.
fn render_stream(mut input: impl Read, mode: TextMode, out: &mut impl Write) -> io::Result<u64> {
    if let TextMode::Raw { ensure_lf } = mode {
        return render::copy_raw(&mut input, out, ensure_lf);
    }
    let mut buf = Vec::new();
    input.read_to_end(&mut buf)?;
    if !buf.is_empty() {
        render_bytes(&buf, mode, out)?;
    }
    Ok(buf.len() as u64)
}

fn render_bytes(bytes: &[u8], mode: TextMode, out: &mut impl Write) -> io::Result<()> {
    match mode {
        TextMode::Raw { ensure_lf } => render::write_raw(out, bytes, ensure_lf),
        TextMode::Quote { line_feed } => render::write_quoted(out, bytes, line_feed),
        TextMode::Hex => render::write_hex(out, bytes),
    }
}

// ── Helpers ────────────────────────────────────────────────────────────

fn opaque(len: u64) -> Finding {
    if len == 0 {
        Finding::Empty
    } else {
        Finding::Opaque { len }
    }
}

fn report(diag: &mut impl Write, finding: &Finding) -> io::Result<()> {
    writeln!(diag, "{finding}")
}

/// Counts the bytes an external decoder pulls through.
struct Counting<R> {
    inner: R,
    count: u64,
}

impl<R> Counting<R> {
    fn new(inner: R) -> Self {
        Self { inner, count: 0 }
    }
}

impl<R: Read> Read for Counting<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.count += n as u64;
        Ok(n)
    }
}
