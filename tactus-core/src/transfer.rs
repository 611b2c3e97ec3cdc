//! Chunked bulk transfers
//!
//! Large transfers are split into pieces no bigger than a reusable,
//! fixed-capacity buffer. [`ChunkPlan`] yields the pieces; [`TransferBuffer`]
//! owns the bytes sent for each one.

use core::ops::Range;

/// Splits `total` items into consecutive ranges of at most `chunk` items
///
/// Every range except possibly the last has exactly `chunk` items. The last
/// one carries the remainder. Zero items yields no ranges.
#[derive(Debug, Clone)]
pub struct ChunkPlan {
    total: usize,
    chunk: usize,
    next: usize,
}

impl ChunkPlan {
    pub fn new(total: usize, chunk: usize) -> Self {
        Self {
            total,
            chunk: chunk.max(1),
            next: 0,
        }
    }

    /// Number of ranges the plan produces
    pub fn chunk_count(&self) -> usize {
        self.total.div_ceil(self.chunk)
    }
}

impl Iterator for ChunkPlan {
    type Item = Range<usize>;

    fn next(&mut self) -> Option<Range<usize>> {
        if self.next >= self.total {
            return None;
        }
        let start = self.next;
        let end = (start + self.chunk).min(self.total);
        self.next = end;
        Some(start..end)
    }
}

/// Reusable byte buffer for one bus transaction
///
/// Capacity is fixed at compile time. Placement in DMA-capable memory and
/// alignment are left to whoever owns the storage.
pub struct TransferBuffer<const BYTES: usize> {
    buf: [u8; BYTES],
}

impl<const BYTES: usize> Default for TransferBuffer<BYTES> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const BYTES: usize> TransferBuffer<BYTES> {
    /// Capacity in 16-bit big-endian pixels
    pub const PIXELS: usize = BYTES / 2;

    pub const fn new() -> Self {
        Self { buf: [0; BYTES] }
    }

    /// Encode pixels as big-endian RGB565 and return the filled prefix
    ///
    /// At most [`Self::PIXELS`] pixels are taken.
    pub fn load_pixels(&mut self, pixels: &[u16]) -> &[u8] {
        let n = pixels.len().min(Self::PIXELS);
        for (dst, px) in self.buf.chunks_exact_mut(2).zip(&pixels[..n]) {
            dst.copy_from_slice(&px.to_be_bytes());
        }
        &self.buf[..n * 2]
    }

    /// Repeat one big-endian color `count` times and return the filled prefix
    pub fn load_solid(&mut self, color: u16, count: usize) -> &[u8] {
        let n = count.min(Self::PIXELS);
        let be = color.to_be_bytes();
        for dst in self.buf.chunks_exact_mut(2).take(n) {
            dst.copy_from_slice(&be);
        }
        &self.buf[..n * 2]
    }
}
