//! 32-bit checksum capability.
//!
//! The frame format protects the descriptor, each block and the whole content
//! with a 32-bit non-cryptographic hash. Readers and writers never call a hash
//! function directly; they are generic over [`Checksum32`], so every checksum
//! path can be exercised with a synthetic hash in tests.
//!
//! [`Xxh32`] is the hash the LZ4 frame format mandates (XXH32, seed 0).
//!
//! # Example
//!
//! ```
//! use lz4stream_core::checksum::{Checksum32, Xxh32};
//!
//! let mut hasher = Xxh32::new();
//! hasher.update(b"hello ");
//! hasher.update(b"world\n");
//! assert_eq!(hasher.finish(), Xxh32::hash(b"hello world\n"));
//! assert_eq!(Xxh32::hash(b""), 0x02CC5D05);
//! ```

use std::fmt;

/// Seed used for every checksum in a frame.
pub const CHECKSUM_SEED: u32 = 0;

/// Incremental 32-bit hash.
pub trait Checksum32 {
    /// Feed bytes into the accumulator.
    fn update(&mut self, bytes: &[u8]);

    /// Hash of everything fed since creation or the last reset.
    ///
    /// Does not consume or alter the accumulator.
    fn finish(&self) -> u32;

    /// Return the accumulator to its freshly seeded state.
    fn reset(&mut self);

    /// One-shot hash of `bytes`.
    fn hash(bytes: &[u8]) -> u32
    where
        Self: Default + Sized,
    {
        let mut hasher = Self::default();
        hasher.update(bytes);
        hasher.finish()
    }
}

/// Streaming XXH32 with seed 0.
#[derive(Clone)]
pub struct Xxh32 {
    state: xxhash_rust::xxh32::Xxh32,
}

impl Xxh32 {
    /// Create a new hasher.
    pub fn new() -> Self {
        Self {
            state: xxhash_rust::xxh32::Xxh32::new(CHECKSUM_SEED),
        }
    }
}

impl Default for Xxh32 {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Xxh32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Xxh32")
            .field("digest", &format_args!("{:#010x}", self.finish()))
            .finish()
    }
}

impl Checksum32 for Xxh32 {
    #[inline]
    fn update(&mut self, bytes: &[u8]) {
        self.state.update(bytes);
    }

    #[inline]
    fn finish(&self) -> u32 {
        self.state.digest()
    }

    fn reset(&mut self) {
        self.state.reset(CHECKSUM_SEED);
    }

    #[inline]
    fn hash(bytes: &[u8]) -> u32 {
        xxhash_rust::xxh32::xxh32(bytes, CHECKSUM_SEED)
    }
}
