//! Content-defined chunking over a blocking [`std::io::Read`] source.
//!
//! This crate splits a byte stream into chunks whose boundaries are
//! determined by the content itself rather than by fixed offsets, so that
//! inserting or deleting bytes in one place in the input only disturbs the
//! chunks near that edit. That property is what makes content-defined
//! chunking useful for deduplicating storage and for transferring only the
//! parts of a file that actually changed.
//!
//! Three chunkers are provided, all implementing [`ContentDefinedChunker`]:
//!
//! - [`FastChunker`] implements FastCDC: a Gear rolling hash tested against a
//!   bitmask, cutting at the first position where the low bits of the hash
//!   are all zero. Chunk sizes follow a discrete, roughly logarithmic
//!   distribution around a fixed 8 KiB target.
//! - [`MaxChunker`] is this crate's second strategy: instead of the first
//!   position where a mask matches, it cuts at the position within
//!   `[min_size, max_size]` where the rolling hash is largest. This spreads
//!   chunk sizes uniformly across the configured range rather than
//!   clustering them near one target, and empirically produces fewer
//!   boundary shifts around small edits. [`SimpleMaxChunker`] computes the
//!   same boundaries by brute force and exists to check `MaxChunker`
//!   against; prefer `MaxChunker` in real use.
//!
//! All three chunkers read from a blocking [`std::io::Read`] and return
//! borrowed chunk views one at a time via `read_next_chunk`, rather than
//! collecting the whole stream into memory up front.
//!
//! ```no_run
//! use maxcdc::{ContentDefinedChunker, MaxChunker, Error};
//!
//! # fn run() -> Result<(), Error> {
//! let file = std::fs::File::open("input.bin")?;
//! let mut chunker = MaxChunker::new(file, 256 * 1024, 2 * 1024, 16 * 1024);
//! loop {
//!     match chunker.read_next_chunk() {
//!         Ok(chunk) => println!("chunk of {} bytes", chunk.len()),
//!         Err(Error::EndOfStream) => break,
//!         Err(e) => return Err(e),
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod error;
mod gear;
mod source;

pub mod fast;
pub mod max;
pub mod simple_max;

pub use error::Error;
pub use fast::FastChunker;
pub use max::MaxChunker;
pub use simple_max::SimpleMaxChunker;

/// Splits a byte stream into content-defined chunks, one at a time.
///
/// Implementations read lazily from an underlying [`std::io::Read`]: each
/// call to `read_next_chunk` pulls in only as much lookahead as the
/// algorithm needs to decide the next boundary, and the returned slice
/// borrows the chunker's internal buffer.
pub trait ContentDefinedChunker {
    /// Return the next chunk, or [`Error::EndOfStream`] once the underlying
    /// reader is exhausted.
    ///
    /// The returned slice is only valid until the next call to
    /// `read_next_chunk`; callers that need to retain chunk data past that
    /// point must copy it out.
    fn read_next_chunk(&mut self) -> Result<&[u8], Error>;
}
