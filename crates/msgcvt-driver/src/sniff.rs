use std::io::{self, Cursor, Read};

use avrox_wire::{AvroxHeader, MAGIC_LEN, is_magic};

use crate::error::DriverError;

/// Classification of an input stream after peeking at its prefix.
///
/// No variant loses bytes: the consumed prefix is always handed back next
/// to the unread remainder, and [`replay`] stitches them together again.
#[derive(Debug)]
pub enum Sniffed<R> {
    /// The stream was empty.
    Empty,
    /// Not a container. `prefix` holds up to [`MAGIC_LEN`] consumed bytes.
    Opaque { prefix: Vec<u8>, rest: R },
    /// An AvroX container with a valid header.
    Container {
        header: AvroxHeader,
        prefix: [u8; MAGIC_LEN],
        rest: R,
    },
}

/// Peek at most [`MAGIC_LEN`] bytes of `input` and classify the stream.
///
/// Short reads are retried until the prefix is full or the stream ends, so
/// a container split across pipe writes is still recognised. Inputs
/// shorter than the prefix are opaque.
///
/// # Errors
///
/// - [`DriverError::Io`] if reading fails.
/// - [`DriverError::InconsistentHeader`] if the magic matched but the
///   header does not decode (an unassigned compression id).
pub fn sniff<R: Read>(mut input: R) -> Result<Sniffed<R>, DriverError> {
    let mut prefix = [0u8; MAGIC_LEN];
    let mut filled = 0;
    while filled < MAGIC_LEN {
        match input.read(&mut prefix[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e.into()),
        }
    }

    if filled == 0 {
        return Ok(Sniffed::Empty);
    }
    if !is_magic(&prefix[..filled]) {
        return Ok(Sniffed::Opaque {
            prefix: prefix[..filled].to_vec(),
            rest: input,
        });
    }
    let header = AvroxHeader::read_from(&prefix).map_err(DriverError::InconsistentHeader)?;
    Ok(Sniffed::Container {
        header,
        prefix,
        rest: input,
    })
}

/// Re-emit a consumed prefix ahead of the rest of the stream.
pub fn replay<P: AsRef<[u8]>, R: Read>(prefix: P, rest: R) -> impl Read {
    Cursor::new(prefix).chain(rest)
}
