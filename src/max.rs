//
// MaxCDC, incremental variant: the production implementation.
//

use std::io::Read;

use crate::gear::GEAR;
use crate::source::BufferedSource;
use crate::{ContentDefinedChunker, Error};

/// A candidate cutting point: the hash at that position and the offset
/// (relative to the current lookahead window) one past the hashed byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Cut {
    hash: u64,
    end: usize,
}

///
/// A maximum-hash chunker that amortizes the cost of [`crate::SimpleMaxChunker`]
/// by carrying a stack of candidate cuts across calls instead of rehashing
/// the whole lookahead window from scratch each time.
///
/// Produces byte-identical output to `SimpleMaxChunker` constructed with the
/// same parameters over the same input — see the `simple_max_equivalence`
/// test in this crate's integration suite. This is the chunker to reach for
/// outside of tests.
///
/// ## How the stack works
///
/// Within one call's hashing window, `end` values in the stack are strictly
/// increasing and `hash` values are strictly decreasing, from bottom to top.
/// A newly found candidate whose hash beats the current best pops every
/// stack entry whose hash it also beats, since those entries can never again
/// be the best choice for any chunk boundary at or after this point. What
/// survives on the stack when a call returns is exactly the state the next
/// call needs to keep hashing from; nothing already seen has to be rehashed.
///
pub struct MaxChunker<R> {
    source: BufferedSource<R>,
    min_size: usize,
    max_size: usize,
    stack: Vec<Cut>,
}

impl<R: Read> MaxChunker<R> {
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
        let mut stack = Vec::with_capacity(max_size / min_size + 2);
        stack.push(Cut { hash: 0, end: 0 });
        Self {
            source: BufferedSource::new(reader, buffer_size),
            min_size,
            max_size,
            stack,
        }
    }
}

impl<R: Read> ContentDefinedChunker for MaxChunker<R> {
    fn read_next_chunk(&mut self) -> Result<&[u8], Error> {
        let discarded = self.source.discard(self.stack[0].end)?;
        for cut in &mut self.stack {
            cut.end -= discarded;
        }

        let d = self.source.peek(self.min_size + self.max_size)?;
        if d.len() <= 2 * self.min_size {
            if d.is_empty() {
                return Err(Error::EndOfStream);
            }
            self.stack.clear();
            self.stack.push(Cut {
                hash: 0,
                end: d.len(),
            });
            return Ok(d);
        }

        let d = &d[..d.len() - self.min_size];

        let (mut previous, mut current, mut old) = if self.stack.len() > 2 {
            let n = self.stack.len();
            let previous = self.stack[n - 2];
            let current = self.stack[n - 1];
            let old = self.stack[1..n - 2].to_vec();
            (previous, current, old)
        } else {
            let mut hash: u64 = 0;
            for &b in &d[self.min_size - 64..self.min_size] {
                hash = (hash << 1).wrapping_add(GEAR[b as usize]);
            }
            let previous = Cut {
                hash,
                end: self.min_size,
            };
            (previous, previous, Vec::new())
        };

        loop {
            let m = self.min_size - (current.end - previous.end);
            let region_end = d.len().min(current.end + m);
            let hash_region = &d[current.end..region_end];

            if hash_region.is_empty() {
                if current.end - previous.end == self.min_size {
                    old.push(previous);
                    previous = current;
                    continue;
                }

                self.stack = old;
                self.stack.push(previous);
                self.stack.push(current);
                let cut_end = self.stack[0].end;
                return Ok(&d[..cut_end]);
            }

            for (i, &b) in hash_region.iter().enumerate() {
                current.hash = (current.hash << 1).wrapping_add(GEAR[b as usize]);
                if current.hash > previous.hash {
                    while old.last().is_some_and(|c| current.hash > c.hash) {
                        old.pop();
                    }
                    previous = Cut {
                        hash: current.hash,
                        end: current.end + i + 1,
                    };
                }
            }
            current.end += hash_region.len();
        }
    }
}
