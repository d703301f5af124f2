/// Implementation of `msgcvt analyse`.
///
/// The input is copied to stdout unchanged (or quoted with `-q`) while a
/// one-line finding such as `14 bytes of AvroX(N: 1 / S: 0.1 / C: 0)` is
/// written to stderr.
use std::io::{self, BufWriter, Read, Write as _};

use anyhow::{Context, Result};
use msgcvt_driver::{AnalyseConfig, Decompression};

use crate::AnalyseArgs;

/// Run the `msgcvt analyse` command.
///
/// # Errors
///
/// Returns an error if reading, decompressing or writing fails, or if the
/// input carries an inconsistent AvroX header.
pub fn run(args: &AnalyseArgs, decompression: Decompression, input: impl Read) -> Result<()> {
    let config = AnalyseConfig {
        decompression,
        quote: args.quote,
    };
    let mut out = BufWriter::new(io::stdout().lock());
    let mut diag = io::stderr().lock();
    msgcvt_driver::analyse(input, &config, &mut out, &mut diag).context("analyse failed")?;
    out.flush()?;
    Ok(())
}
