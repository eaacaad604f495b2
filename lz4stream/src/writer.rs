//! Streaming frame writer.

use crate::block::{BlockEncoder, END_MARK};
use crate::codec::Lz4Codec;
use crate::descriptor::FrameDescriptor;
use lz4stream_core::checksum::{Checksum32, Xxh32};
use lz4stream_core::error::{FrameError, Result};
use lz4stream_core::traits::{BlockCodec, CompressionLevel};
use std::io::{self, Write};

#[derive(Debug)]
enum WriterState {
    /// Header not written yet.
    Unopened,
    Writing,
    Closed,
    /// A write failed; the error is returned again on every later call.
    Faulted(FrameError),
}

/// Compresses a byte stream into a single frame.
///
/// The header is written lazily, on the first write or on close. Each write
/// call becomes exactly one block, so callers control block boundaries; a
/// chunk longer than the block capacity is cut short and the write reports
/// how much it consumed.
///
/// Dropping the writer without calling [`close`](Self::close) leaves the
/// frame without its end marker.
///
/// # Example
///
/// ```
/// use lz4stream::{CompressionLevel, FrameWriter};
/// use std::io::Write;
///
/// let mut writer = FrameWriter::new(Vec::new(), CompressionLevel::DEFAULT);
/// writer.write_all(b"hello world\n").unwrap();
/// writer.close().unwrap();
///
/// let frame = writer.into_inner();
/// assert_eq!(&frame[..7], &[0x04, 0x22, 0x4D, 0x18, 0x64, 0x70, 0xB9]);
/// ```
#[derive(Debug)]
pub struct FrameWriter<W, C = Lz4Codec, H = Xxh32> {
    writer: W,
    encoder: BlockEncoder<C, H>,
    /// Framed bytes of the block being written.
    frame: Vec<u8>,
    state: WriterState,
}

impl<W: Write> FrameWriter<W> {
    /// Create a writer using the preset descriptor.
    pub fn new(writer: W, level: CompressionLevel) -> Self {
        Self::with_descriptor(writer, level, FrameDescriptor::new())
    }

    /// Create a writer with custom frame options.
    pub fn with_descriptor(writer: W, level: CompressionLevel, descriptor: FrameDescriptor) -> Self {
        Self::with_codec(writer, Lz4Codec::new(level), descriptor)
    }
}

impl<W: Write, C: BlockCodec, H: Checksum32 + Default> FrameWriter<W, C, H> {
    /// Create a writer with a custom block codec and checksum.
    pub fn with_codec(writer: W, codec: C, descriptor: FrameDescriptor) -> Self {
        Self {
            writer,
            encoder: BlockEncoder::new(codec, descriptor),
            frame: Vec::new(),
            state: WriterState::Unopened,
        }
    }

    /// Options this frame is written with.
    pub fn descriptor(&self) -> &FrameDescriptor {
        self.encoder.descriptor()
    }

    /// Get a reference to the underlying writer.
    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    /// Get a mutable reference to the underlying writer.
    ///
    /// Writing to it directly corrupts the frame.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    /// Consume this writer and return the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Encode `chunk` as one block, returning how many bytes were consumed.
    ///
    /// At most one block capacity is consumed per call. An empty chunk writes
    /// an empty stored block.
    pub fn write_chunk(&mut self, chunk: &[u8]) -> Result<usize> {
        self.check_open()?;
        let result = self.write_block(chunk);
        self.record(result)
    }

    /// Finish the frame: end marker, then the content checksum if enabled.
    ///
    /// The underlying writer is flushed but not closed. Closing again is a
    /// no-op.
    pub fn close(&mut self) -> Result<()> {
        match &self.state {
            WriterState::Closed => return Ok(()),
            WriterState::Faulted(err) => return Err(err.replay()),
            _ => {}
        }
        let result = self.finish();
        self.record(result)?;
        self.state = WriterState::Closed;
        Ok(())
    }

    fn check_open(&self) -> Result<()> {
        match &self.state {
            WriterState::Closed => Err(FrameError::StreamClosed),
            WriterState::Faulted(err) => Err(err.replay()),
            _ => Ok(()),
        }
    }

    /// Cache a failure so later calls replay it.
    fn record<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(err) = &result {
            log::debug!("frame writer failed: {err}");
            self.state = WriterState::Faulted(err.replay());
        }
        result
    }

    fn ensure_header(&mut self) -> Result<()> {
        if let WriterState::Unopened = self.state {
            self.encoder
                .descriptor()
                .write_to::<W, H>(&mut self.writer)?;
            self.state = WriterState::Writing;
        }
        Ok(())
    }

    fn write_block(&mut self, chunk: &[u8]) -> Result<usize> {
        self.ensure_header()?;

        let consumed = chunk.len().min(self.encoder.descriptor().block_capacity());
        self.frame.clear();
        self.encoder.encode(&chunk[..consumed], &mut self.frame)?;
        self.writer.write_all(&self.frame)?;
        Ok(consumed)
    }

    fn finish(&mut self) -> Result<()> {
        self.ensure_header()?;

        self.writer.write_all(&END_MARK.to_le_bytes())?;
        if self.encoder.descriptor().content_checksum {
            let checksum = self.encoder.content_checksum();
            self.writer.write_all(&checksum.to_le_bytes())?;
            log::debug!("frame closed, content checksum {checksum:#010x}");
        } else {
            log::debug!("frame closed");
        }
        self.writer.flush()?;
        Ok(())
    }
}

impl<W: Write, C: BlockCodec, H: Checksum32 + Default> Write for FrameWriter<W, C, H> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(self.write_chunk(buf)?)
    }

    /// Flushes the underlying writer. Blocks are emitted as they are written,
    /// so nothing is buffered here.
    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}
