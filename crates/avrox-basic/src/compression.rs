use std::io::{Read, Write};

use avrox_wire::Compression;
use flate2::read::{DeflateDecoder, GzDecoder};
use flate2::write::{DeflateEncoder, GzEncoder};

use crate::error::CompressionError;

/// Upper bound on a decompressed container body (256 MiB).
///
/// A single basic value never legitimately gets near this; the limit only
/// exists so a crafted header cannot make the decoder allocate without
/// bound.
pub const MAX_BODY_SIZE: usize = 256 * 1024 * 1024;

/// Compress a body with the codec named by `kind`.
///
/// `Compression::None` returns the input unchanged. Unlike a size-driven
/// encoder, the codec is always applied when requested, because the
/// header already advertises it.
///
/// # Errors
///
/// [`CompressionError::CompressFailed`] if the codec rejects the input.
pub fn compress(kind: Compression, data: &[u8]) -> Result<Vec<u8>, CompressionError> {
    let failed = |reason: String| CompressionError::CompressFailed {
        codec: kind.name(),
        reason,
    };
    match kind {
        Compression::None => Ok(data.to_vec()),
        Compression::Snappy => snap::raw::Encoder::new()
            .compress_vec(data)
            .map_err(|e| failed(e.to_string())),
        Compression::Flate => {
            let mut enc = DeflateEncoder::new(Vec::new(), flate2::Compression::default());
            enc.write_all(data).map_err(|e| failed(e.to_string()))?;
            enc.finish().map_err(|e| failed(e.to_string()))
        }
        Compression::Gzip => {
            let mut enc = GzEncoder::new(Vec::new(), flate2::Compression::default());
            enc.write_all(data).map_err(|e| failed(e.to_string()))?;
            enc.finish().map_err(|e| failed(e.to_string()))
        }
    }
}

/// Decompress a body with the codec named by `kind`.
///
/// The `max_size` parameter bounds the decompressed output. Streaming
/// codecs stop reading one byte past the limit; snappy checks its
/// declared length before allocating.
///
/// # Errors
///
/// - [`CompressionError::DecompressFailed`] if the codec cannot decode
///   the input.
/// - [`CompressionError::DecompressionBomb`] if the output would exceed
///   `max_size`.
pub fn decompress(
    kind: Compression,
    data: &[u8],
    max_size: usize,
) -> Result<Vec<u8>, CompressionError> {
    let failed = |reason: String| CompressionError::DecompressFailed {
        codec: kind.name(),
        reason,
    };
    let out = match kind {
        Compression::None => data.to_vec(),
        Compression::Snappy => {
            let declared = snap::raw::decompress_len(data).map_err(|e| failed(e.to_string()))?;
            if declared > max_size {
                return Err(CompressionError::DecompressionBomb {
                    actual: declared,
                    limit: max_size,
                });
            }
            snap::raw::Decoder::new()
                .decompress_vec(data)
                .map_err(|e| failed(e.to_string()))?
        }
        Compression::Flate => read_bounded(DeflateDecoder::new(data), max_size)
            .map_err(|e| failed(e.to_string()))?,
        Compression::Gzip => {
            read_bounded(GzDecoder::new(data), max_size).map_err(|e| failed(e.to_string()))?
        }
    };
    if out.len() > max_size {
        return Err(CompressionError::DecompressionBomb {
            actual: out.len(),
            limit: max_size,
        });
    }
    Ok(out)
}

fn read_bounded(reader: impl Read, max_size: usize) -> std::io::Result<Vec<u8>> {
    let mut out = Vec::new();
    let limit = u64::try_from(max_size).unwrap_or(u64::MAX).saturating_add(1);
    reader.take(limit).read_to_end(&mut out)?;
    Ok(out)
}
