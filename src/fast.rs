//
// FastCDC: the classic bitmask-threshold chunking strategy.
//

use std::io::Read;

use crate::gear::GEAR;
use crate::source::BufferedSource;
use crate::{ContentDefinedChunker, Error};

/// Preferred minimum chunk size.
pub const MIN_SIZE: usize = 2 * 1024;
/// Size at which the strict mask gives way to the loose mask.
pub const NORMAL_SIZE: usize = 8 * 1024;
/// Preferred maximum chunk size.
pub const MAX_SIZE: usize = 64 * 1024;

const MASK_S: u64 = 0x0000_d9f0_0353_0000;
const MASK_L: u64 = 0x0000_d900_0353_0000;

///
/// FastCDC chunker: cuts at the first position where the Gear rolling hash
/// matches a bitmask, using a stricter mask below the "normal" chunk size
/// and a looser one above it.
///
/// Sizes are fixed (`min = 2 KiB`, `normal = 8 KiB`, `max = 64 KiB`), matching
/// the parameters from the FastCDC paper's reference chunker.
///
/// ```no_run
/// use maxcdc::{ContentDefinedChunker, FastChunker};
///
/// let file = std::fs::File::open("input.bin").unwrap();
/// let mut chunker = FastChunker::new(file, 64 * 1024);
/// loop {
///     match chunker.read_next_chunk() {
///         Ok(chunk) => println!("chunk of {} bytes", chunk.len()),
///         Err(_) => break,
///     }
/// }
/// ```
///
pub struct FastChunker<R> {
    source: BufferedSource<R>,
    previous_len: usize,
}

impl<R: Read> FastChunker<R> {
    /// Construct a chunker reading from `reader`.
    ///
    /// # Panics
    ///
    /// Panics if `buffer_size < MAX_SIZE`.
    pub fn new(reader: R, buffer_size: usize) -> Self {
        assert!(
            buffer_size >= MAX_SIZE,
            "buffer_size ({buffer_size}) must be at least MAX_SIZE ({MAX_SIZE})"
        );
        Self {
            source: BufferedSource::new(reader, buffer_size),
            previous_len: 0,
        }
    }
}

impl<R: Read> ContentDefinedChunker for FastChunker<R> {
    fn read_next_chunk(&mut self) -> Result<&[u8], Error> {
        self.source.discard(self.previous_len)?;

        let d = self.source.peek(MAX_SIZE)?;
        if d.is_empty() {
            return Err(Error::EndOfStream);
        }
        let len = cut_point(d);
        self.previous_len = len;
        Ok(&d[..len])
    }
}

/// Find the cut length within `d`, a view of up to `MAX_SIZE` bytes.
///
/// Mirrors the reference scan order exactly, including the fact that the
/// byte which satisfies the mask test is *not* included in the returned
/// length (the cut falls one byte earlier than the matching byte's index).
fn cut_point(d: &[u8]) -> usize {
    let len = d.len();
    let mut hash: u64 = 0;

    if len >= NORMAL_SIZE {
        for i in 0..NORMAL_SIZE - MIN_SIZE {
            hash = (hash << 1).wrapping_add(GEAR[d[MIN_SIZE + i] as usize]);
            if hash & MASK_S == 0 {
                return MIN_SIZE + i;
            }
        }
        for i in 0..len - NORMAL_SIZE {
            hash = (hash << 1).wrapping_add(GEAR[d[NORMAL_SIZE + i] as usize]);
            if hash & MASK_L == 0 {
                return NORMAL_SIZE + i;
            }
        }
    } else if len >= MIN_SIZE {
        for i in 0..len - MIN_SIZE {
            hash = (hash << 1).wrapping_add(GEAR[d[MIN_SIZE + i] as usize]);
            if hash & MASK_S == 0 {
                return MIN_SIZE + i;
            }
        }
    }
    len
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk_all(mut chunker: FastChunker<&[u8]>) -> Vec<Vec<u8>> {
        let mut chunks = Vec::new();
        loop {
            match chunker.read_next_chunk() {
                Ok(chunk) => chunks.push(chunk.to_vec()),
                Err(Error::EndOfStream) => break,
                Err(e) => panic!("unexpected error: {e}"),
            }
        }
        chunks
    }

    #[test]
    fn empty_input_is_end_of_stream() {
        let mut chunker = FastChunker::new(&b""[..], MAX_SIZE);
        assert!(matches!(
            chunker.read_next_chunk(),
            Err(Error::EndOfStream)
        ));
    }

    #[test]
    fn short_input_is_a_single_final_chunk() {
        let data = vec![0u8; MIN_SIZE - 1];
        let mut chunker = FastChunker::new(&data[..], MAX_SIZE);
        let chunk = chunker.read_next_chunk().unwrap().to_vec();
        assert_eq!(chunk.len(), MIN_SIZE - 1);
        assert!(matches!(
            chunker.read_next_chunk(),
            Err(Error::EndOfStream)
        ));
    }

    #[test]
    fn all_zeros_never_match_either_mask_and_falls_out_at_max_size() {
        let data = vec![0u8; MAX_SIZE];
        let chunker = FastChunker::new(&data[..], MAX_SIZE);
        let chunks = chunk_all(chunker);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].len(), MAX_SIZE);
    }

    #[test]
    fn ten_max_chunks_of_zeros_split_evenly() {
        let data = vec![0u8; 10 * MAX_SIZE];
        let chunker = FastChunker::new(&data[..], MAX_SIZE);
        let chunks = chunk_all(chunker);
        assert_eq!(chunks.len(), 10);
        for chunk in &chunks {
            assert_eq!(chunk.len(), MAX_SIZE);
        }
    }

    #[test]
    fn concatenation_round_trips_on_pseudorandom_input() {
        use rand::rngs::StdRng;
        use rand::{RngCore, SeedableRng};

        let mut rng = StdRng::seed_from_u64(42);
        let mut data = vec![0u8; 5 * MAX_SIZE + 37];
        rng.fill_bytes(&mut data);

        let chunker = FastChunker::new(&data[..], MAX_SIZE);
        let chunks = chunk_all(chunker);
        let total: usize = chunks.iter().map(|c| c.len()).sum();
        assert_eq!(total, data.len());

        let mut reassembled = Vec::with_capacity(data.len());
        for chunk in &chunks {
            reassembled.extend_from_slice(chunk);
        }
        assert_eq!(reassembled, data);

        for chunk in &chunks[..chunks.len() - 1] {
            assert!(chunk.len() >= MIN_SIZE && chunk.len() <= MAX_SIZE);
        }
        assert!(chunks.last().unwrap().len() <= MAX_SIZE);
    }

    #[test]
    fn determinism() {
        use rand::rngs::StdRng;
        use rand::{RngCore, SeedableRng};

        let mut rng = StdRng::seed_from_u64(7);
        let mut data = vec![0u8; 3 * MAX_SIZE];
        rng.fill_bytes(&mut data);

        let chunks_a = chunk_all(FastChunker::new(&data[..], MAX_SIZE));
        let chunks_b = chunk_all(FastChunker::new(&data[..], MAX_SIZE));
        assert_eq!(chunks_a, chunks_b);
    }

    /// A 732-byte sequence, found by brute-force search over the crate's
    /// Gear table, whose 732nd byte is the first to satisfy
    /// `(hash << 1) + GEAR[b]) & MASK_S == 0` when hashing starts fresh at
    /// `MIN_SIZE`. Exercises the exact scan-order semantics in `cut_point`.
    #[rustfmt::skip]
    const CRAFTED_CUT_SEQUENCE: [u8; 732] = [
        68, 32, 130, 60, 253, 230, 241, 194, 107, 48, 249, 14, 199, 221, 1, 228,
        136, 117, 52, 162, 15, 11, 13, 4, 195, 110, 216, 14, 113, 224, 253, 119,
        176, 118, 112, 235, 148, 11, 213, 51, 95, 151, 61, 170, 216, 97, 155, 145,
        255, 201, 17, 245, 124, 206, 212, 88, 187, 191, 44, 224, 55, 83, 201, 189,
        250, 15, 240, 22, 157, 201, 87, 86, 116, 6, 102, 118, 207, 176, 180, 235,
        137, 2, 196, 66, 105, 218, 28, 246, 186, 102, 211, 248, 182, 212, 177, 0,
        169, 234, 14, 117, 90, 92, 46, 130, 16, 36, 42, 8, 231, 7, 143, 127,
        137, 56, 94, 176, 148, 35, 85, 81, 130, 86, 139, 150, 232, 164, 254, 242,
        58, 12, 159, 197, 175, 215, 96, 132, 55, 129, 107, 221, 10, 115, 9, 203,
        74, 18, 82, 228, 218, 112, 230, 114, 15, 202, 164, 218, 30, 152, 64, 108,
        24, 156, 36, 39, 158, 152, 81, 213, 129, 66, 4, 19, 111, 235, 87, 19,
        193, 102, 177, 50, 105, 221, 99, 252, 53, 199, 151, 255, 8, 166, 205, 144,
        9, 80, 102, 167, 69, 173, 219, 109, 136, 49, 194, 176, 248, 120, 33, 20,
        43, 68, 86, 85, 109, 137, 170, 130, 188, 173, 174, 58, 149, 120, 250, 69,
        53, 164, 20, 208, 37, 194, 75, 64, 174, 58, 193, 39, 114, 41, 136, 186,
        151, 58, 234, 141, 55, 23, 151, 6, 7, 46, 211, 58, 20, 96, 122, 215,
        82, 59, 230, 85, 123, 81, 52, 222, 193, 150, 129, 244, 161, 51, 106, 162,
        20, 13, 5, 151, 163, 230, 200, 160, 204, 32, 32, 162, 233, 57, 128, 110,
        240, 182, 132, 93, 106, 157, 101, 126, 184, 41, 143, 45, 229, 46, 173, 116,
        199, 157, 21, 167, 95, 162, 155, 125, 171, 51, 47, 125, 112, 10, 124, 205,
        37, 137, 36, 38, 11, 5, 148, 183, 252, 240, 78, 51, 167, 39, 88, 91,
        76, 72, 163, 156, 54, 150, 64, 105, 72, 16, 161, 105, 91, 153, 221, 80,
        24, 126, 129, 32, 228, 220, 128, 224, 232, 5, 202, 173, 87, 132, 248, 12,
        213, 9, 31, 181, 70, 64, 70, 132, 141, 203, 205, 88, 45, 119, 248, 3,
        90, 162, 224, 115, 122, 160, 253, 245, 115, 211, 172, 140, 112, 24, 36, 188,
        81, 104, 159, 152, 153, 190, 84, 237, 43, 63, 193, 90, 79, 128, 218, 111,
        26, 253, 201, 178, 196, 84, 20, 46, 130, 51, 136, 42, 71, 41, 227, 123,
        195, 221, 203, 84, 166, 224, 64, 249, 108, 61, 220, 209, 60, 151, 142, 127,
        193, 2, 97, 224, 10, 15, 124, 133, 105, 88, 145, 75, 102, 139, 159, 128,
        228, 86, 182, 251, 215, 62, 106, 196, 104, 145, 55, 12, 60, 6, 151, 69,
        38, 191, 159, 223, 182, 165, 0, 63, 226, 230, 179, 156, 204, 173, 252, 57,
        193, 195, 104, 1, 142, 101, 236, 209, 156, 87, 230, 101, 184, 1, 199, 218,
        207, 172, 34, 252, 126, 148, 10, 208, 79, 203, 138, 91, 37, 5, 178, 135,
        210, 155, 77, 236, 132, 248, 86, 239, 23, 138, 50, 216, 35, 181, 34, 226,
        10, 84, 82, 47, 205, 141, 155, 106, 106, 121, 170, 137, 35, 38, 188, 239,
        25, 86, 152, 138, 182, 118, 200, 204, 88, 247, 132, 168, 113, 132, 125, 15,
        206, 162, 221, 127, 137, 97, 37, 84, 227, 75, 134, 235, 83, 70, 70, 225,
        184, 158, 205, 123, 59, 105, 156, 34, 54, 116, 203, 164, 252, 51, 95, 23,
        28, 11, 110, 17, 253, 226, 175, 140, 60, 88, 48, 113, 204, 119, 253, 230,
        193, 86, 118, 120, 145, 236, 199, 108, 231, 132, 169, 254, 56, 109, 40, 23,
        7, 2, 245, 163, 196, 147, 100, 204, 81, 77, 15, 7, 198, 74, 29, 194,
        130, 66, 40, 236, 155, 7, 18, 31, 66, 21, 140, 60, 221, 46, 97, 14,
        255, 66, 142, 98, 229, 199, 168, 137, 133, 124, 125, 30, 89, 179, 219, 31,
        180, 211, 102, 217, 35, 136, 37, 128, 90, 49, 77, 30, 104, 219, 22, 27,
        46, 240, 189, 50, 160, 20, 64, 16, 226, 65, 202, 228, 12, 138, 46, 128,
        166, 43, 154, 17, 196, 29, 133, 160, 66, 133, 194, 59,
    ];

    #[test]
    fn crafted_mask_match_cuts_at_the_exact_expected_offset() {
        let mut data = vec![0u8; MIN_SIZE];
        data.extend_from_slice(&CRAFTED_CUT_SEQUENCE);
        data.extend(std::iter::repeat(0u8).take(5_000));

        let mut chunker = FastChunker::new(&data[..], MAX_SIZE);
        let chunk = chunker.read_next_chunk().unwrap();
        assert_eq!(chunk.len(), MIN_SIZE + CRAFTED_CUT_SEQUENCE.len() - 1);
    }
}
