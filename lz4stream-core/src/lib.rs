//! # lz4stream Core
//!
//! Core components for the lz4stream frame library.
//!
//! This crate provides the leaf building blocks the framing layer is built on:
//!
//! - [`bitstream`]: MSB-first bit-field reader that hashes what it consumes
//! - [`checksum`]: 32-bit checksum capability and the XXH32 implementation
//! - [`traits`]: Block codec capability and compression level
//! - [`error`]: Error taxonomy
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ L3: CLI                                                 │
//! │     lz4stream binary (file compress / decompress)      │
//! ├─────────────────────────────────────────────────────────┤
//! │ L2: Frame                                               │
//! │     Descriptor, block encoder/decoder, reader/writer   │
//! ├─────────────────────────────────────────────────────────┤
//! │ L1: Core (this crate)                                   │
//! │     BitFieldReader, Checksum32, BlockCodec, errors     │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use lz4stream_core::bitstream::BitFieldReader;
//! use lz4stream_core::checksum::{Checksum32, Xxh32};
//! use std::io::Cursor;
//!
//! let mut reader = BitFieldReader::new(Cursor::new([0x64u8, 0x70]), Xxh32::new());
//! let version = reader.read_bits(2).unwrap();
//! assert_eq!(version, 1);
//!
//! assert_eq!(Xxh32::hash(b""), 0x02CC5D05);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod bitstream;
pub mod checksum;
pub mod error;
pub mod traits;

// Re-exports for convenience
pub use bitstream::BitFieldReader;
pub use checksum::{CHECKSUM_SEED, Checksum32, Xxh32};
pub use error::{Feature, FrameError, Result};
pub use traits::{BlockCodec, CompressionLevel};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::bitstream::BitFieldReader;
    pub use crate::checksum::{Checksum32, Xxh32};
    pub use crate::error::{FrameError, Result};
    pub use crate::traits::{BlockCodec, CompressionLevel};
}
