/// Implementation of `msgcvt avrox`.
///
/// Reads the whole input as literal text, optionally unquotes it and
/// strips one trailing line feed, converts it to the requested basic type
/// and writes the resulting container to stdout.
///
/// ```text
/// $ printf 'test\n' | msgcvt avrox string | xxd
/// 00000000: 9300 0001 0000 01fe 0a74 6573 740a       .........test.
/// ```
use std::io::{self, BufWriter, Read, Write as _};

use anyhow::{Context, Result};
use avrox_basic::{LiteralKind, LiteralOptions};
use avrox_wire::Compression;
use clap::ValueEnum;
use msgcvt_driver::{Decompression, EncodeConfig};

use crate::{AvroxArgs, BasicType, CompressArg};

/// Run the `msgcvt avrox` command.
///
/// # Errors
///
/// Returns an error if the literal does not parse as the requested type or
/// if reading or writing fails.
pub fn run(args: &AvroxArgs, decompression: Decompression, input: impl Read) -> Result<()> {
    let config = build_config(args, decompression);
    let mut out = BufWriter::new(io::stdout().lock());
    let mut diag = io::stderr().lock();
    msgcvt_driver::encode(input, &config, &mut out, &mut diag)
        .with_context(|| format!("cannot create AvroX {}", type_name(args.kind)))?;
    out.flush()?;
    Ok(())
}

fn build_config(args: &AvroxArgs, decompression: Decompression) -> EncodeConfig {
    EncodeConfig {
        decompression,
        kind: literal_kind(args.kind),
        options: LiteralOptions {
            unquote: args.unquote,
            strip_lf: args.strip_lf,
        },
        compression: args.compress.map_or(Compression::None, compression),
        quote: args.quote,
    }
}

fn literal_kind(kind: BasicType) -> LiteralKind {
    match kind {
        BasicType::String => LiteralKind::String,
        BasicType::Int => LiteralKind::Int,
        BasicType::Bytes => LiteralKind::Bytes,
        BasicType::Decimal => LiteralKind::Decimal,
        BasicType::RawDate => LiteralKind::RawDate,
    }
}

fn type_name(kind: BasicType) -> String {
    kind.to_possible_value()
        .map_or_else(String::new, |v| v.get_name().to_owned())
}

fn compression(arg: CompressArg) -> Compression {
    match arg {
        CompressArg::Snappy => Compression::Snappy,
        CompressArg::Gzip => Compression::Gzip,
        CompressArg::Flate => Compression::Flate,
    }
}
