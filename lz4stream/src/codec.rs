//! LZ4 block codec backed by `lz4_flex` and a hash-chain matcher.
//!
//! The frame layer only needs two things from a block codec: compress a
//! chunk into at most N bytes, and decompress a body into at most the block
//! capacity. [`Lz4Codec`] provides both over the raw LZ4 block format.

use crate::hc::HcMatcher;
use lz4_flex::block::{compress_into, decompress_into, get_maximum_output_size};
use lz4stream_core::error::{FrameError, Result};
use lz4stream_core::traits::{BlockCodec, CompressionLevel};

/// Lowest level that switches to the hash-chain matcher.
const HC_MIN_LEVEL: u8 = 7;

/// Candidates examined per position by the hash-chain matcher.
fn hc_attempts(level: CompressionLevel) -> usize {
    match level.level() {
        7 => 256,
        8 => 1024,
        _ => 4096,
    }
}

/// Raw LZ4 block codec.
///
/// | Level | Matcher |
/// |-------|---------|
/// | 0     | none, every block is stored raw |
/// | 1-6   | `lz4_flex` greedy matcher |
/// | 7-9   | hash-chain matcher, searching deeper at each level |
#[derive(Debug, Clone, Default)]
pub struct Lz4Codec {
    level: CompressionLevel,
    hc: Option<HcMatcher>,
    /// Worst-case sized output for callers whose buffer is below the
    /// `lz4_flex` bound.
    scratch: Vec<u8>,
}

impl Lz4Codec {
    /// Create a codec for the given level.
    pub fn new(level: CompressionLevel) -> Self {
        let hc = (level.level() >= HC_MIN_LEVEL).then(|| HcMatcher::new(hc_attempts(level)));
        Self {
            level,
            hc,
            scratch: Vec::new(),
        }
    }

    /// Compression level this codec was created with.
    pub fn level(&self) -> CompressionLevel {
        self.level
    }
}

impl BlockCodec for Lz4Codec {
    fn compress(&mut self, src: &[u8], dst: &mut [u8]) -> Option<usize> {
        if src.is_empty() || self.level.is_store() {
            return None;
        }

        if let Some(hc) = &mut self.hc {
            return hc.compress(src, dst);
        }

        // lz4_flex wants room for the worst case up front.
        let bound = get_maximum_output_size(src.len());
        if dst.len() >= bound {
            return compress_into(src, dst).ok();
        }

        if self.scratch.len() < bound {
            self.scratch.resize(bound, 0);
        }
        let len = compress_into(src, &mut self.scratch).ok()?;
        let out = dst.get_mut(..len)?;
        out.copy_from_slice(&self.scratch[..len]);
        Some(len)
    }

    fn compress_bound(&self, src_len: usize) -> usize {
        if self.level.is_store() || self.hc.is_some() {
            src_len
        } else {
            get_maximum_output_size(src_len)
        }
    }

    fn decompress(&mut self, src: &[u8], dst: &mut [u8]) -> Result<usize> {
        decompress_into(src, dst).map_err(|err| FrameError::corrupt(err.to_string()))
    }
}
