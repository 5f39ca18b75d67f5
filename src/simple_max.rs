//
// MaxCDC, reference variant: scans the full candidate window and keeps
// whichever hash turns out largest. Simpler and slower than `MaxChunker`;
// kept around to check the optimized implementation against.
//

use std::io::Read;

use crate::gear::GEAR;
use crate::source::BufferedSource;
use crate::{ContentDefinedChunker, Error};

///
/// A maximum-hash chunker that rehashes its entire lookahead window on every
/// call instead of carrying state between calls.
///
/// Cuts at the position within `[min_size, max_size]` where the Gear rolling
/// hash (restarted `64` bytes before `min_size`, to warm up the hash before
/// the first eligible cut position) is largest. Unlike [`crate::FastChunker`],
/// there is no bitmask test and no early exit: every candidate position in
/// the window is compared, so the chunk boundary is the argmax of the hash
/// rather than its first zero-match.
///
/// This chunker exists to validate [`crate::MaxChunker`], which produces
/// identical output using a stack of candidate cuts instead of rescanning
/// from scratch. Prefer `MaxChunker` outside of tests: this type reprocesses
/// up to `max_size - min_size` bytes on every call that the incremental
/// chunker would instead carry over.
///
pub struct SimpleMaxChunker<R> {
    source: BufferedSource<R>,
    min_size: usize,
    max_size: usize,
    previous_len: usize,
}

impl<R: Read> SimpleMaxChunker<R> {
    /// Construct a chunker reading from `reader`, with lookahead buffer
    /// `buffer_size` and chunk bounds `[min_size, max_size]`.
    ///
    /// # Panics
    ///
    /// Panics if `min_size < 64`, if `max_size < 2 * min_size`, or if
    /// `buffer_size < min_size + max_size`.
    pub fn new(reader: R, buffer_size: usize, min_size: usize, max_size: usize) -> Self {
        assert!(min_size >= 64, "min_size ({min_size}) must be at least 64");
        assert!(
            max_size >= 2 * min_size,
            "max_size ({max_size}) must be at least twice min_size ({min_size})"
        );
        assert!(
            buffer_size >= min_size + max_size,
            "buffer_size ({buffer_size}) must be at least min_size + max_size ({})",
            min_size + max_size
        );
        Self {
            source: BufferedSource::new(reader, buffer_size),
            min_size,
            max_size,
            previous_len: 0,
        }
    }
}

impl<R: Read> ContentDefinedChunker for SimpleMaxChunker<R> {
    fn read_next_chunk(&mut self) -> Result<&[u8], Error> {
        self.source.discard(self.previous_len)?;

        let d = self.source.peek(self.min_size + self.max_size)?;
        if d.len() <= 2 * self.min_size {
            if d.is_empty() {
                return Err(Error::EndOfStream);
            }
            self.previous_len = d.len();
            return Ok(d);
        }

        let d = &d[..d.len() - self.min_size];

        let mut hash: u64 = 0;
        for &b in &d[self.min_size - 64..self.min_size] {
            hash = (hash << 1).wrapping_add(GEAR[b as usize]);
        }

        let mut best_hash = hash;
        let mut best_len = self.min_size;
        for (i, &b) in d[self.min_size..].iter().enumerate() {
            hash = (hash << 1).wrapping_add(GEAR[b as usize]);
            if best_hash < hash {
                best_hash = hash;
                best_len = self.min_size + i + 1;
            }
        }

        self.previous_len = best_len;
        Ok(&d[..best_len])
    }
}
