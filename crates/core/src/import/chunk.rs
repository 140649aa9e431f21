//! Splitting rows into fixed-size chunks.

use std::num::NonZeroUsize;
use std::ops::Range;

/// A contiguous slice of the original row list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkRange {
    /// 0-based chunk index.
    pub index: usize,
    /// Index of the chunk's first row in the original list.
    pub start: usize,
    /// Number of rows in the chunk.
    pub len: usize,
}

impl ChunkRange {
    /// Row range covered by this chunk.
    #[must_use]
    pub const fn rows(&self) -> Range<usize> {
        self.start..self.start + self.len
    }

    /// 1-based chunk number for display.
    #[must_use]
    pub const fn number(&self) -> usize {
        self.index + 1
    }
}

/// Split `total` rows into chunks of `size`; the last chunk holds the remainder.
#[must_use]
pub fn chunk_ranges(total: usize, size: NonZeroUsize) -> Vec<ChunkRange> {
    let size = size.get();
    (0..total)
        .step_by(size)
        .enumerate()
        .map(|(index, start)| ChunkRange {
            index,
            start,
            len: size.min(total - start),
        })
        .collect()
}
