/// Implementation of `msgcvt translate`.
///
/// Builds a [`TranslateConfig`] from the chosen format and its detection
/// flags, then runs the driver with stdout as output and stderr as the
/// diagnostic channel. Without a format, `raw` with default flags is used.
use std::io::{self, BufWriter, Read, Write as _};

use anyhow::{Context, Result};
use msgcvt_driver::schema_registry::parse_schema_file;
use msgcvt_driver::{Decompression, JsonSource, RenderMode, SchemaRegistry, TranslateConfig};

use crate::{DetectArgs, Format, RawArgs, TranslateArgs};

/// Run the `msgcvt translate` command.
///
/// # Errors
///
/// Returns an error if a schema path cannot be read or the driver fails.
pub fn run(args: &TranslateArgs, decompression: Decompression, input: impl Read) -> Result<()> {
    let default = Format::Raw(RawArgs::default());
    let config = build_config(args.format.as_ref().unwrap_or(&default), decompression)?;

    let mut out = BufWriter::new(io::stdout().lock());
    let mut diag = io::stderr().lock();
    msgcvt_driver::translate(input, &config, &mut out, &mut diag).context("translate failed")?;
    out.flush()?;
    Ok(())
}

fn build_config(format: &Format, decompression: Decompression) -> Result<TranslateConfig> {
    let (mode, detect) = match format {
        Format::Quote(detect) => (RenderMode::Quote, Some(detect)),
        Format::Raw(raw) => (
            RenderMode::Raw {
                ensure_lf: raw.ensure_lf,
            },
            Some(&raw.detect),
        ),
        Format::Hex(detect) => (RenderMode::Hex, Some(detect)),
        Format::Hexdump => (RenderMode::HexDump, None),
        Format::Cbor => (RenderMode::Json(JsonSource::Cbor), None),
        Format::Gob => (RenderMode::Json(JsonSource::Gob), None),
        Format::Avro(avro) => {
            let schema = parse_schema_file(&avro.schema)
                .with_context(|| format!("cannot load schema {}", avro.schema.display()))?;
            (RenderMode::Json(JsonSource::Avro(schema)), None)
        }
    };

    let mut config = TranslateConfig {
        decompression,
        mode,
        ..TranslateConfig::default()
    };
    if let Some(detect) = detect {
        apply_detect(&mut config, detect)?;
    }
    Ok(config)
}

fn apply_detect(config: &mut TranslateConfig, detect: &DetectArgs) -> Result<()> {
    config.detect_avrox = !detect.no_avrox;
    config.detect_basics = !detect.no_basics;
    config.decimal_float = detect.decimal_float;
    if config.detect_avrox && !detect.avsc.is_empty() {
        config.registry = SchemaRegistry::scan(&detect.avsc).context("scanning avsc")?;
        tracing::debug!(schemas = config.registry.len(), "avsc registry loaded");
    }
    Ok(())
}
