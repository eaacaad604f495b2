//! Bit-level reading of fixed-layout header fields.
//!
//! Frame descriptors pack several flags and small integers into single
//! bytes, most significant bit first. [`BitFieldReader`] extracts those
//! fields in order while feeding every byte it pulls from the source into a
//! [`Checksum32`] accumulator, so the header checksum can be verified after
//! the fields have been decoded.
//!
//! # Bit Ordering
//!
//! Fields are read MSB-first: the first bit returned is bit 7 of the first
//! byte. This matches the natural bit order of the byte, not the LSB-first
//! order used by DEFLATE-style bitstreams.
//!
//! # Example
//!
//! ```
//! use lz4stream_core::bitstream::BitFieldReader;
//! use lz4stream_core::checksum::{Checksum32, Xxh32};
//! use std::io::Cursor;
//!
//! let data = [0b0110_0100u8, 0x70];
//! let mut reader = BitFieldReader::new(Cursor::new(data), Xxh32::new());
//! assert_eq!(reader.read_bits(2).unwrap(), 0b01);
//! assert!(reader.read_bit().unwrap());
//! assert_eq!(reader.read_bits(5).unwrap(), 0b00100);
//! assert_eq!(reader.read_bits(8).unwrap(), 0x70);
//! assert_eq!(reader.checksum(), Xxh32::hash(&data));
//! ```

use crate::checksum::Checksum32;
use crate::error::Result;
use std::io::Read;

/// MSB-first bit-field reader with a running checksum of consumed bytes.
#[derive(Debug)]
pub struct BitFieldReader<R: Read, H: Checksum32> {
    /// Underlying byte source.
    reader: R,
    /// Buffered bits, right-aligned.
    buffer: u64,
    /// Number of valid bits in buffer.
    bits_in_buffer: u8,
    /// Checksum of every byte pulled from `reader`.
    hasher: H,
}

impl<R: Read, H: Checksum32> BitFieldReader<R, H> {
    /// Create a reader hashing consumed bytes into `hasher`.
    pub fn new(reader: R, hasher: H) -> Self {
        Self {
            reader,
            buffer: 0,
            bits_in_buffer: 0,
            hasher,
        }
    }

    /// Consume this reader and return the underlying source.
    ///
    /// Bits still buffered are discarded.
    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Number of buffered bits not yet returned.
    pub fn bits_available(&self) -> u8 {
        self.bits_in_buffer
    }

    /// Checksum over every byte consumed so far.
    ///
    /// Bytes are hashed when they are pulled from the source, so a byte whose
    /// bits are only partly returned is already included.
    pub fn checksum(&self) -> u32 {
        self.hasher.finish()
    }

    /// Pull whole bytes until at least `count` bits are buffered.
    fn fill_buffer(&mut self, count: u8) -> Result<()> {
        while self.bits_in_buffer < count {
            let mut byte = [0u8; 1];
            // UnexpectedEof converts to FrameError::TruncatedStream.
            self.reader.read_exact(&mut byte)?;
            self.hasher.update(&byte);
            self.buffer = (self.buffer << 8) | u64::from(byte[0]);
            self.bits_in_buffer += 8;
        }
        Ok(())
    }

    /// Read `count` bits (1..=32), first bit in the most significant position.
    pub fn read_bits(&mut self, count: u8) -> Result<u32> {
        debug_assert!(
            (1..=32).contains(&count),
            "bit count must be within 1..=32"
        );

        self.fill_buffer(count)?;

        let shift = self.bits_in_buffer - count;
        let mask = (1u64 << count) - 1;
        let value = ((self.buffer >> shift) & mask) as u32;

        self.bits_in_buffer = shift;
        self.buffer &= (1u64 << shift) - 1;

        Ok(value)
    }

    /// Read a single bit.
    pub fn read_bit(&mut self) -> Result<bool> {
        Ok(self.read_bits(1)? != 0)
    }
}
