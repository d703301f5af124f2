use std::io::{self, Write};

const BYTES_PER_LINE: usize = 16;

/// Streaming canonical hex dump writer.
///
/// Bytes written to the dumper are formatted 16 per line; a partial line
/// is held back until more data arrives or [`finish`](Self::finish) pads
/// and flushes it.
///
/// ```text
/// 00000000  74 65 73 74 0a 00 01 02  03 04 05 06 07 08 09 0a  |test............|
/// 00000010  ff                                                |.|
/// ```
pub struct HexDumper<W: Write> {
    inner: W,
    line: [u8; BYTES_PER_LINE],
    used: usize,
    offset: u64,
}

impl<W: Write> HexDumper<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            line: [0; BYTES_PER_LINE],
            used: 0,
            offset: 0,
        }
    }

    /// Flush any partial line and return the inner writer.
    ///
    /// # Errors
    ///
    /// Propagates write errors from the inner writer.
    pub fn finish(mut self) -> io::Result<W> {
        if self.used > 0 {
            self.emit_line()?;
        }
        self.inner.flush()?;
        Ok(self.inner)
    }

    /// Number of bytes dumped so far.
    pub fn total(&self) -> u64 {
        self.offset + self.used as u64
    }

    fn emit_line(&mut self) -> io::Result<()> {
        let mut text = format!("{:08x}  ", self.offset);
        for slot in 0..BYTES_PER_LINE {
            match self.line.get(slot).filter(|_| slot < self.used) {
                Some(b) => text.push_str(&format!("{b:02x} ")),
                None => text.push_str("   "),
            }
            if slot == 7 {
                text.push(' ');
            }
        }
        text.push_str(" |");
        text.extend(self.line[..self.used].iter().map(|&b| {
            if (0x20..=0x7e).contains(&b) {
                char::from(b)
            } else {
                '.'
            }
        }));
        text.push_str("|\n");
        self.inner.write_all(text.as_bytes())?;

        self.offset += self.used as u64;
        self.used = 0;
        Ok(())
    }
}

impl<W: Write> Write for HexDumper<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        for &b in buf {
            self.line[self.used] = b;
            self.used += 1;
            if self.used == BYTES_PER_LINE {
                self.emit_line()?;
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
