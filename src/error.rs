//
// Error type shared by every chunker in this crate.
//

use std::fmt;

/// The error type returned by [`crate::ContentDefinedChunker::read_next_chunk`].
#[derive(Debug)]
pub enum Error {
    /// All chunks have been returned; the underlying source is exhausted.
    ///
    /// Returned exactly once, on the call that first finds the buffered
    /// source empty. Calling `read_next_chunk` again afterward has
    /// unspecified behavior; construct a fresh chunker instead.
    EndOfStream,
    /// An error propagated from the underlying reader.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::EndOfStream => write!(f, "end of stream"),
            Error::Io(err) => write!(f, "I/O error: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::EndOfStream => None,
            Error::Io(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}
