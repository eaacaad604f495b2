//! Block framing.
//!
//! After the descriptor a frame is a sequence of blocks:
//!
//! ```text
//! +------------+----------------+-------------------+
//! | Size (LE)  | Body           | Block checksum    |
//! | 4 bytes    | size bytes     | 4 bytes, optional |
//! +------------+----------------+-------------------+
//! ```
//!
//! The high bit of the size field marks a body stored raw; the low 31 bits
//! are the body length. A size field of exactly zero is the end marker.
//! `0x80000000` is a legal, empty stored block.

use crate::descriptor::FrameDescriptor;
use lz4stream_core::checksum::Checksum32;
use lz4stream_core::error::{FrameError, Result};
use lz4stream_core::traits::BlockCodec;
use std::io::Read;

/// Size field value terminating the block sequence.
pub const END_MARK: u32 = 0;

/// Size field bit marking a body stored without compression.
pub const STORED_FLAG: u32 = 0x8000_0000;

const SIZE_MASK: u32 = 0x7FFF_FFFF;

/// How a block body was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    /// Body holds codec output.
    Compressed,
    /// Body holds the chunk verbatim.
    Stored,
}

/// Turns plaintext chunks into framed blocks.
///
/// Also accumulates the content checksum over every non-empty chunk when
/// the descriptor enables it.
#[derive(Debug)]
pub struct BlockEncoder<C, H> {
    codec: C,
    descriptor: FrameDescriptor,
    compressed: Vec<u8>,
    content: H,
}

impl<C: BlockCodec, H: Checksum32 + Default> BlockEncoder<C, H> {
    /// Create an encoder for frames using `descriptor`.
    pub fn new(codec: C, descriptor: FrameDescriptor) -> Self {
        Self {
            codec,
            descriptor,
            compressed: Vec::new(),
            content: H::default(),
        }
    }

    /// Descriptor this encoder frames blocks for.
    pub fn descriptor(&self) -> &FrameDescriptor {
        &self.descriptor
    }

    /// Content checksum over every chunk encoded so far.
    pub fn content_checksum(&self) -> u32 {
        self.content.finish()
    }

    /// Append the framed form of `chunk` to `out`.
    ///
    /// The body is compressed only when the codec output is strictly shorter
    /// than the chunk; otherwise it is stored raw. An empty chunk always
    /// produces an empty stored block.
    pub fn encode(&mut self, chunk: &[u8], out: &mut Vec<u8>) -> Result<BlockKind> {
        let capacity = self.descriptor.block_capacity();
        if chunk.len() > capacity {
            return Err(FrameError::invalid_block_size(chunk.len(), capacity));
        }

        let compressed_len = if chunk.is_empty() {
            None
        } else {
            let bound = self.codec.compress_bound(chunk.len()).max(chunk.len());
            if self.compressed.len() < bound {
                self.compressed.resize(bound, 0);
            }
            self.codec
                .compress(chunk, &mut self.compressed[..bound])
                .filter(|&len| len < chunk.len())
        };

        let (size_field, body, kind) = match compressed_len {
            Some(len) => (len as u32, &self.compressed[..len], BlockKind::Compressed),
            None => (chunk.len() as u32 | STORED_FLAG, chunk, BlockKind::Stored),
        };

        out.reserve(4 + body.len() + 4);
        out.extend_from_slice(&size_field.to_le_bytes());
        out.extend_from_slice(body);
        if self.descriptor.block_checksum {
            out.extend_from_slice(&H::hash(body).to_le_bytes());
        }

        if self.descriptor.content_checksum && !chunk.is_empty() {
            self.content.update(chunk);
        }

        log::trace!(
            "encoded {:?} block: {} -> {} bytes",
            kind,
            chunk.len(),
            body.len()
        );
        Ok(kind)
    }
}

/// Result of decoding one block.
#[derive(Debug, PartialEq, Eq)]
pub enum BlockOutcome<'a> {
    /// Plaintext of a data block. May be empty.
    Data(&'a [u8]),
    /// The end marker was read.
    EndOfStream,
}

/// Reads framed blocks back into plaintext.
///
/// Accumulates the content checksum over everything it decodes; verifying
/// it against the stored value is left to the caller.
#[derive(Debug)]
pub struct BlockDecoder<C, H> {
    codec: C,
    descriptor: FrameDescriptor,
    body: Vec<u8>,
    decoded: Vec<u8>,
    content: H,
}

impl<C: BlockCodec, H: Checksum32 + Default> BlockDecoder<C, H> {
    /// Create a decoder for a frame with the given descriptor.
    pub fn new(codec: C, descriptor: FrameDescriptor) -> Self {
        Self {
            codec,
            descriptor,
            body: Vec::new(),
            decoded: Vec::new(),
            content: H::default(),
        }
    }

    /// Descriptor of the frame being decoded.
    pub fn descriptor(&self) -> &FrameDescriptor {
        &self.descriptor
    }

    /// The block codec.
    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Content checksum over every block decoded so far.
    pub fn content_checksum(&self) -> u32 {
        self.content.finish()
    }

    /// Read the next block from `reader`.
    ///
    /// The declared size is checked against the block capacity before any
    /// body byte is read. Running out of input anywhere, including right
    /// before the size field, is a [`FrameError::TruncatedStream`].
    pub fn decode_next<R: Read>(&mut self, reader: &mut R) -> Result<BlockOutcome<'_>> {
        let mut field = [0u8; 4];
        reader.read_exact(&mut field)?;
        let field = u32::from_le_bytes(field);
        if field == END_MARK {
            log::trace!("end marker");
            return Ok(BlockOutcome::EndOfStream);
        }

        let stored = field & STORED_FLAG != 0;
        let size = (field & SIZE_MASK) as usize;
        let capacity = self.descriptor.block_capacity();
        if size > capacity {
            return Err(FrameError::invalid_block_size(size, capacity));
        }

        self.body.resize(size, 0);
        reader.read_exact(&mut self.body)?;

        if self.descriptor.block_checksum {
            let mut stored_sum = [0u8; 4];
            reader.read_exact(&mut stored_sum)?;
            let expected = u32::from_le_bytes(stored_sum);
            let computed = H::hash(&self.body);
            if expected != computed {
                return Err(FrameError::block_checksum(expected, computed));
            }
        }

        let data: &[u8] = if stored {
            &self.body
        } else {
            if self.decoded.len() < capacity {
                self.decoded.resize(capacity, 0);
            }
            let len = self
                .codec
                .decompress(&self.body, &mut self.decoded[..capacity])?;
            &self.decoded[..len]
        };

        if self.descriptor.content_checksum {
            self.content.update(data);
        }

        log::trace!(
            "decoded {} block: {} -> {} bytes",
            if stored { "stored" } else { "compressed" },
            size,
            data.len()
        );
        Ok(BlockOutcome::Data(data))
    }
}
