//! Block codec capability and compression level.
//!
//! The framing layer never compresses bytes itself. Each block is handed to
//! a [`BlockCodec`], which either produces a compressed body that fits the
//! given output buffer or reports that it cannot.

use crate::error::{FrameError, Result};

/// Block-level compression primitive used by frame readers and writers.
///
/// Blocks are independent: a codec may keep scratch buffers between calls
/// but must not carry match history from one block to the next.
pub trait BlockCodec {
    /// Compress `src` into `dst`.
    ///
    /// `dst.len()` is the largest acceptable output. Returns the compressed
    /// length, or `None` when no representable output fits (including the
    /// case of nothing to compress). Callers fall back to storing `src` raw.
    fn compress(&mut self, src: &[u8], dst: &mut [u8]) -> Option<usize>;

    /// Output buffer length that lets [`compress`](Self::compress) work
    /// without internal copies for an input of `src_len` bytes.
    ///
    /// Callers still only keep results shorter than `src_len`.
    fn compress_bound(&self, src_len: usize) -> usize {
        src_len
    }

    /// Decompress `src` into `dst`, returning the number of bytes produced.
    ///
    /// `dst.len()` is the block capacity; output that would exceed it is
    /// corrupt. Errors are reported as [`FrameError::BlockCorrupt`].
    fn decompress(&mut self, src: &[u8], dst: &mut [u8]) -> Result<usize>;
}

impl<C: BlockCodec + ?Sized> BlockCodec for &mut C {
    fn compress(&mut self, src: &[u8], dst: &mut [u8]) -> Option<usize> {
        (**self).compress(src, dst)
    }

    fn compress_bound(&self, src_len: usize) -> usize {
        (**self).compress_bound(src_len)
    }

    fn decompress(&mut self, src: &[u8], dst: &mut [u8]) -> Result<usize> {
        (**self).decompress(src, dst)
    }
}

/// Compression level (0-9).
///
/// Level 0 stores every block raw; higher levels let the codec search
/// harder for matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CompressionLevel(u8);

impl CompressionLevel {
    /// No compression (store only).
    pub const NONE: Self = Self(0);
    /// Fastest compression.
    pub const FAST: Self = Self(1);
    /// Default compression (balanced).
    pub const DEFAULT: Self = Self(6);
    /// Best compression (slowest).
    pub const BEST: Self = Self(9);

    /// Create a compression level, rejecting values above 9.
    pub fn new(level: u32) -> Result<Self> {
        if level > u32::from(Self::BEST.0) {
            return Err(FrameError::InvalidLevel { level });
        }
        Ok(Self(level as u8))
    }

    /// Get the level value.
    pub fn level(&self) -> u8 {
        self.0
    }

    /// Whether this level stores blocks without attempting compression.
    pub fn is_store(&self) -> bool {
        self.0 == 0
    }
}

impl Default for CompressionLevel {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<u32> for CompressionLevel {
    type Error = FrameError;

    fn try_from(level: u32) -> Result<Self> {
        Self::new(level)
    }
}
