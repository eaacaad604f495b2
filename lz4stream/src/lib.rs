//! Streaming LZ4 frame reader and writer.
//!
//! A frame is a 7-byte descriptor followed by independently compressed
//! blocks, an end marker and an optional XXH32 checksum of the whole content.
//! [`FrameWriter`] produces frames from an `io::Write` stream one block per
//! write call; [`FrameReader`] decodes them back through `io::Read`.
//!
//! # Features
//!
//! - Header checksum, per-block checksum and content checksum verification
//! - Block sizes from 64 KB to 4 MB
//! - Blocks that do not compress are stored raw
//! - Levels 7-9 trade speed for a deeper hash-chain match search
//! - Pluggable block codec and checksum for testing
//!
//! Dependent blocks, stored content size and dictionaries are recognised
//! in the descriptor and rejected.
//!
//! # Example
//!
//! ```
//! use lz4stream::{CompressionLevel, compress, decompress};
//!
//! let data = b"Hello, World! Hello, World! Hello, World!";
//! let frame = compress(data, CompressionLevel::DEFAULT).unwrap();
//! let restored = decompress(&frame).unwrap();
//! assert_eq!(restored, data);
//! ```

mod block;
mod codec;
mod descriptor;
mod hc;
mod reader;
mod writer;

pub use block::{BlockDecoder, BlockEncoder, BlockKind, BlockOutcome, END_MARK, STORED_FLAG};
pub use codec::Lz4Codec;
pub use descriptor::{BlockMaxSize, FRAME_VERSION, FrameDescriptor, HEADER_SIZE, LZ4_FRAME_MAGIC};
pub use lz4stream_core::checksum::{Checksum32, Xxh32};
pub use lz4stream_core::error::{Feature, FrameError, Result};
pub use lz4stream_core::traits::{BlockCodec, CompressionLevel};
pub use reader::FrameReader;
pub use writer::FrameWriter;

use std::io::{Read, Write};

/// Parse a frame header from `source` and return a reader for its content.
pub fn open_reader<R: Read>(source: R) -> Result<FrameReader<R>> {
    FrameReader::new(source)
}

/// Start a frame on `sink` with the preset descriptor.
///
/// Nothing is written until the first write or close.
pub fn open_writer<W: Write>(sink: W, level: CompressionLevel) -> FrameWriter<W> {
    FrameWriter::new(sink, level)
}

/// Compress `input` into a complete frame using the preset descriptor.
pub fn compress(input: &[u8], level: CompressionLevel) -> Result<Vec<u8>> {
    compress_with_options(input, level, FrameDescriptor::new())
}

/// Compress `input` into a complete frame with custom options.
///
/// The input is split into blocks of the descriptor's capacity.
pub fn compress_with_options(
    input: &[u8],
    level: CompressionLevel,
    desc: FrameDescriptor,
) -> Result<Vec<u8>> {
    let output = Vec::with_capacity(HEADER_SIZE + input.len() + 8);
    let mut writer = FrameWriter::with_descriptor(output, level, desc);
    for chunk in input.chunks(desc.block_capacity()) {
        writer.write_chunk(chunk)?;
    }
    writer.close()?;
    Ok(writer.into_inner())
}

/// Decompress a complete frame, verifying every checksum it carries.
///
/// Bytes after the content checksum are ignored.
pub fn decompress(input: &[u8]) -> Result<Vec<u8>> {
    let mut reader = FrameReader::new(input)?;
    let mut output = Vec::new();
    reader.read_to_end(&mut output)?;
    reader.close()?;
    Ok(output)
}
