use std::io::{BufRead, BufReader, Cursor, Read};

use avrox_basic::compression::{self, MAX_BODY_SIZE};
use avrox_wire::Compression;
use flate2::read::{DeflateDecoder, GzDecoder};

use crate::config::Decompression;
use crate::error::DriverError;

/// Wrap `input` with the selected decompression strategy.
///
/// Streaming codecs decode lazily as the returned reader is consumed.
/// Gzip is primed once here so a malformed gzip header fails immediately
/// instead of on the first downstream read.
///
/// Snappy block mode has no incremental form: the whole input is read and
/// decoded at once. If that fails the original bytes become the effective
/// stream, because block-mode snappy cannot be told apart from plain data
/// without trying.
///
/// # Errors
///
/// - [`DriverError::Io`] if reading the input for snappy block mode fails.
/// - [`DriverError::Decompress`] if the gzip header is invalid.
pub fn wrap<'a, R: Read + 'a>(
    mut input: R,
    mode: Decompression,
) -> Result<Box<dyn Read + 'a>, DriverError> {
    if mode != Decompression::None {
        tracing::debug!(?mode, "decompressing input");
    }
    match mode {
        Decompression::None => Ok(Box::new(input)),
        Decompression::SnappyBlock => {
            let mut raw = Vec::new();
            input.read_to_end(&mut raw)?;
            match compression::decompress(Compression::Snappy, &raw, MAX_BODY_SIZE) {
                Ok(decoded) => Ok(Box::new(Cursor::new(decoded))),
                Err(e) => {
                    tracing::debug!(
                        error = %e,
                        "input is not snappy block data, passing it through"
                    );
                    Ok(Box::new(Cursor::new(raw)))
                }
            }
        }
        Decompression::SnappyStream => Ok(Box::new(snap::read::FrameDecoder::new(input))),
        Decompression::Gzip => {
            let mut reader = BufReader::new(GzDecoder::new(input));
            reader.fill_buf().map_err(|source| DriverError::Decompress {
                codec: "gzip",
                source,
            })?;
            Ok(Box::new(reader))
        }
        Decompression::Deflate => Ok(Box::new(DeflateDecoder::new(input))),
    }
}
