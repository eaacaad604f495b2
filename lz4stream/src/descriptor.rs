//! Frame descriptor encoding and parsing.
//!
//! Every frame starts with a fixed 7-byte header:
//!
//! ```text
//! +---------+-------+-------+-------+
//! |  Magic  |  FLG  |  BD   |  HC   |
//! | 4 bytes | 1     | 1     | 1     |
//! +---------+-------+-------+-------+
//!
//! FLG: [version:2][independent:1][block checksum:1][content size:1]
//!      [content checksum:1][reserved:1][dictionary:1]
//! BD:  [reserved:1][block max size:3][reserved:4]
//! HC:  (xxh32(FLG || BD) >> 8) & 0xFF
//! ```
//!
//! The magic number is little-endian; the FLG and BD bit fields are read
//! most significant bit first.

use lz4stream_core::bitstream::BitFieldReader;
use lz4stream_core::checksum::Checksum32;
use lz4stream_core::error::{Feature, FrameError, Result};
use std::io::{Read, Write};

/// LZ4 frame magic number.
pub const LZ4_FRAME_MAGIC: u32 = 0x184D2204;

/// The only descriptor version understood.
pub const FRAME_VERSION: u8 = 1;

/// Size of the complete frame header (magic + FLG + BD + HC).
pub const HEADER_SIZE: usize = 7;

const FLG_INDEPENDENT: u8 = 0x20;
const FLG_BLOCK_CHECKSUM: u8 = 0x10;
const FLG_CONTENT_CHECKSUM: u8 = 0x04;

/// Block maximum sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum BlockMaxSize {
    /// 64 KB maximum block size.
    Size64KB = 4,
    /// 256 KB maximum block size.
    Size256KB = 5,
    /// 1 MB maximum block size.
    Size1MB = 6,
    /// 4 MB maximum block size (default).
    #[default]
    Size4MB = 7,
}

impl BlockMaxSize {
    /// Get the actual byte size for this block max setting.
    pub fn size_bytes(self) -> usize {
        1 << (8 + 2 * self.code() as usize)
    }

    /// The 3-bit code stored in the BD byte.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Convert from the 3-bit BD field value.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            4 => Some(BlockMaxSize::Size64KB),
            5 => Some(BlockMaxSize::Size256KB),
            6 => Some(BlockMaxSize::Size1MB),
            7 => Some(BlockMaxSize::Size4MB),
            _ => None,
        }
    }
}

/// Stream-wide options carried by the frame header.
///
/// Version 1, independent blocks, no content size and no dictionary are
/// implied: frames using anything else are rejected when parsed and can not
/// be described by this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameDescriptor {
    /// Each block body is followed by its XXH32 checksum.
    pub block_checksum: bool,
    /// The frame ends with an XXH32 checksum of the whole content.
    pub content_checksum: bool,
    /// Upper bound on the decoded size of any block.
    pub block_max_size: BlockMaxSize,
}

impl FrameDescriptor {
    /// The preset written by frame writers: 4 MB blocks, no block checksums,
    /// content checksum enabled.
    pub fn new() -> Self {
        Self {
            block_checksum: false,
            content_checksum: true,
            block_max_size: BlockMaxSize::default(),
        }
    }

    /// Set block checksum flag.
    pub fn with_block_checksum(mut self, enabled: bool) -> Self {
        self.block_checksum = enabled;
        self
    }

    /// Set content checksum flag.
    pub fn with_content_checksum(mut self, enabled: bool) -> Self {
        self.content_checksum = enabled;
        self
    }

    /// Set block max size.
    pub fn with_block_max_size(mut self, size: BlockMaxSize) -> Self {
        self.block_max_size = size;
        self
    }

    /// Largest decoded size of a single block.
    pub fn block_capacity(&self) -> usize {
        self.block_max_size.size_bytes()
    }

    /// Encode FLG byte.
    pub fn flg_byte(&self) -> u8 {
        let mut flg = (FRAME_VERSION << 6) | FLG_INDEPENDENT;
        if self.block_checksum {
            flg |= FLG_BLOCK_CHECKSUM;
        }
        if self.content_checksum {
            flg |= FLG_CONTENT_CHECKSUM;
        }
        flg
    }

    /// Encode BD byte.
    pub fn bd_byte(&self) -> u8 {
        self.block_max_size.code() << 4
    }

    /// Header checksum byte: bits 8..16 of the hash of FLG and BD.
    pub fn header_checksum<H: Checksum32 + Default>(&self) -> u8 {
        header_checksum_of(H::hash(&[self.flg_byte(), self.bd_byte()]))
    }

    /// Encode the complete 7-byte frame header.
    pub fn encode<H: Checksum32 + Default>(&self) -> [u8; HEADER_SIZE] {
        let magic = LZ4_FRAME_MAGIC.to_le_bytes();
        [
            magic[0],
            magic[1],
            magic[2],
            magic[3],
            self.flg_byte(),
            self.bd_byte(),
            self.header_checksum::<H>(),
        ]
    }

    /// Write the frame header to `writer`.
    pub fn write_to<W: Write, H: Checksum32 + Default>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&self.encode::<H>())?;
        log::debug!(
            "wrote frame header: FLG={:#04x} BD={:#04x}",
            self.flg_byte(),
            self.bd_byte()
        );
        Ok(())
    }

    /// Read and validate a frame header, consuming exactly its 7 bytes.
    ///
    /// The header checksum is verified before the field values, so any
    /// corruption of FLG or BD surfaces as
    /// [`FrameError::DescriptorChecksumMismatch`]; a header with a valid
    /// checksum but unsupported contents yields the specific error.
    pub fn read_from<R: Read, H: Checksum32 + Default>(reader: &mut R) -> Result<Self> {
        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;
        let magic = u32::from_le_bytes(magic);
        if magic != LZ4_FRAME_MAGIC {
            return Err(FrameError::invalid_magic(LZ4_FRAME_MAGIC, magic));
        }

        let mut bits = BitFieldReader::new((&mut *reader).take(3), H::default());
        let fields = RawFields {
            version: bits.read_bits(2)? as u8,
            independent: bits.read_bit()?,
            block_checksum: bits.read_bit()?,
            content_size: bits.read_bit()?,
            content_checksum: bits.read_bit()?,
            flg_reserved: bits.read_bit()?,
            dictionary: bits.read_bit()?,
            bd_high_reserved: bits.read_bit()?,
            block_size_code: bits.read_bits(3)? as u8,
            bd_low_reserved: bits.read_bits(4)? as u8,
        };

        let expected = header_checksum_of(bits.checksum());
        let found = bits.read_bits(8)? as u8;
        if expected != found {
            return Err(FrameError::DescriptorChecksumMismatch { expected, found });
        }

        let desc = fields.validate()?;
        log::debug!("parsed frame descriptor: {desc:?}");
        Ok(desc)
    }
}

impl Default for FrameDescriptor {
    fn default() -> Self {
        Self::new()
    }
}

fn header_checksum_of(hash: u32) -> u8 {
    ((hash >> 8) & 0xFF) as u8
}

/// Descriptor bit fields as read, before validation.
struct RawFields {
    version: u8,
    independent: bool,
    block_checksum: bool,
    content_size: bool,
    content_checksum: bool,
    flg_reserved: bool,
    dictionary: bool,
    bd_high_reserved: bool,
    block_size_code: u8,
    bd_low_reserved: u8,
}

impl RawFields {
    fn validate(self) -> Result<FrameDescriptor> {
        if self.version != FRAME_VERSION {
            return Err(FrameError::UnsupportedVersion {
                version: self.version,
            });
        }
        if !self.independent {
            return Err(FrameError::unsupported(Feature::DependentBlocks));
        }
        if self.content_size {
            return Err(FrameError::unsupported(Feature::ContentSize));
        }
        if self.flg_reserved {
            return Err(FrameError::reserved_bits("FLG"));
        }
        if self.dictionary {
            return Err(FrameError::unsupported(Feature::Dictionary));
        }
        if self.bd_high_reserved {
            return Err(FrameError::reserved_bits("BD"));
        }
        let block_max_size =
            BlockMaxSize::from_code(self.block_size_code).ok_or(FrameError::UnsupportedBlockSize {
                code: self.block_size_code,
            })?;
        if self.bd_low_reserved != 0 {
            return Err(FrameError::reserved_bits("BD"));
        }

        Ok(FrameDescriptor {
            block_checksum: self.block_checksum,
            content_checksum: self.content_checksum,
            block_max_size,
        })
    }
}
