//
// Buffered byte source shared by every chunker in this crate.
//

use std::io::{self, Read};

/// A blocking reader wrapped in a single pre-allocated buffer, exposing
/// `peek`/`discard` lookahead instead of `Read`'s consume-only interface.
///
/// This plays the same role as `bufio.Reader` in the original source: the
/// chunkers need to look several kilobytes ahead of the cursor without
/// consuming what they looked at, then later decide how much of that
/// lookahead to actually consume. `Read` alone can't express that; a
/// `BufReader` can via `fill_buf`/`consume`, but those only guarantee one
/// `read` worth of data, not a specific horizon, so this type fills to a
/// requested length itself.
pub(crate) struct BufferedSource<R> {
    reader: R,
    buf: Vec<u8>,
    filled: usize,
    eof: bool,
}

impl<R: Read> BufferedSource<R> {
    /// Construct a source backed by `reader`, with an internal buffer large
    /// enough to hold `buffer_size` bytes. Every `peek` window used against
    /// this source must be `<= buffer_size`.
    pub(crate) fn new(reader: R, buffer_size: usize) -> Self {
        Self {
            reader,
            buf: vec![0u8; buffer_size],
            filled: 0,
            eof: false,
        }
    }

    /// Return a view of up to `n` upcoming bytes without consuming them.
    ///
    /// Returns fewer than `n` bytes only once the underlying reader has
    /// signalled end of stream. The returned slice borrows this source's
    /// internal buffer and is invalidated by the next `peek` or `discard`.
    pub(crate) fn peek(&mut self, n: usize) -> io::Result<&[u8]> {
        assert!(
            n <= self.buf.len(),
            "peek window {n} exceeds buffer capacity {}",
            self.buf.len()
        );
        while self.filled < n && !self.eof {
            let read = self.reader.read(&mut self.buf[self.filled..n])?;
            if read == 0 {
                self.eof = true;
            } else {
                self.filled += read;
            }
        }
        Ok(&self.buf[..self.filled.min(n)])
    }

    /// Advance the cursor by up to `n` bytes, returning the number actually
    /// discarded (less than `n` only at end of stream).
    pub(crate) fn discard(&mut self, n: usize) -> io::Result<usize> {
        let k = n.min(self.filled);
        if k > 0 {
            self.buf.copy_within(k..self.filled, 0);
            self.filled -= k;
        }
        Ok(k)
    }
}
