//! Streaming frame reader.

use crate::block::{BlockDecoder, BlockOutcome};
use crate::codec::Lz4Codec;
use crate::descriptor::FrameDescriptor;
use lz4stream_core::checksum::{Checksum32, Xxh32};
use lz4stream_core::error::{FrameError, Result};
use lz4stream_core::traits::BlockCodec;
use std::io::{self, Read};

#[derive(Debug)]
enum ReaderState {
    Ready,
    /// End marker seen; the content checksum has not been read.
    Ended,
    Closed,
    /// A read failed; the error is returned again on every later call.
    Faulted(FrameError),
}

/// Decompresses a single frame from a byte source.
///
/// The descriptor is parsed when the reader is created. Blocks are decoded
/// one at a time as the caller reads; reading never looks past the end
/// marker, so the content checksum is only verified by
/// [`close`](Self::close).
///
/// # Example
///
/// ```
/// use lz4stream::{CompressionLevel, FrameReader, compress};
/// use std::io::Read;
///
/// let frame = compress(b"hello world\n", CompressionLevel::DEFAULT).unwrap();
///
/// let mut reader = FrameReader::new(&frame[..]).unwrap();
/// let mut text = String::new();
/// reader.read_to_string(&mut text).unwrap();
/// reader.close().unwrap();
/// assert_eq!(text, "hello world\n");
/// ```
#[derive(Debug)]
pub struct FrameReader<R, C = Lz4Codec, H = Xxh32> {
    reader: R,
    decoder: BlockDecoder<C, H>,
    /// Decoded bytes not yet returned to the caller.
    staged: Vec<u8>,
    staged_pos: usize,
    state: ReaderState,
}

impl<R: Read> FrameReader<R> {
    /// Parse the frame header and create a reader using the LZ4 codec.
    pub fn new(reader: R) -> Result<Self> {
        Self::with_codec(reader, Lz4Codec::default())
    }
}

impl<R: Read, C: BlockCodec, H: Checksum32 + Default> FrameReader<R, C, H> {
    /// Parse the frame header and create a reader using `codec`.
    ///
    /// Consumes exactly the 7 header bytes from `reader`.
    pub fn with_codec(mut reader: R, codec: C) -> Result<Self> {
        let descriptor = FrameDescriptor::read_from::<R, H>(&mut reader)?;
        Ok(Self {
            reader,
            decoder: BlockDecoder::new(codec, descriptor),
            staged: Vec::new(),
            staged_pos: 0,
            state: ReaderState::Ready,
        })
    }

    /// Options of the frame being read.
    pub fn descriptor(&self) -> &FrameDescriptor {
        self.decoder.descriptor()
    }

    /// Get a reference to the underlying reader.
    pub fn get_ref(&self) -> &R {
        &self.reader
    }

    /// Get a mutable reference to the underlying reader.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.reader
    }

    /// Consume this reader and return the underlying reader.
    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Copy decoded bytes into `buf`, decoding blocks as needed.
    ///
    /// Returns 0 once the end marker has been reached. Empty blocks are
    /// skipped, so 0 is never returned for a non-empty `buf` before that.
    pub fn read_chunk(&mut self, buf: &mut [u8]) -> Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        loop {
            let pending = &self.staged[self.staged_pos..];
            if !pending.is_empty() {
                let n = pending.len().min(buf.len());
                buf[..n].copy_from_slice(&pending[..n]);
                self.staged_pos += n;
                return Ok(n);
            }

            match &self.state {
                ReaderState::Ready => {}
                ReaderState::Ended | ReaderState::Closed => return Ok(0),
                ReaderState::Faulted(err) => return Err(err.replay()),
            }

            let result = self.stage_next_block();
            self.record(result)?;
        }
    }

    /// Finish reading the frame and verify its content checksum.
    ///
    /// Blocks the caller has not read are decoded and discarded first, so
    /// the checksum always covers the whole content. The underlying reader
    /// is not closed. Closing again is a no-op.
    pub fn close(&mut self) -> Result<()> {
        match &self.state {
            ReaderState::Closed => return Ok(()),
            ReaderState::Faulted(err) => return Err(err.replay()),
            _ => {}
        }
        let result = self.finish();
        self.record(result)?;
        self.state = ReaderState::Closed;
        Ok(())
    }

    /// Cache a failure so later calls replay it.
    fn record<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(err) = &result {
            log::debug!("frame reader failed: {err}");
            self.state = ReaderState::Faulted(err.replay());
        }
        result
    }

    fn stage_next_block(&mut self) -> Result<()> {
        match self.decoder.decode_next(&mut self.reader)? {
            BlockOutcome::Data(data) => {
                self.staged.clear();
                self.staged.extend_from_slice(data);
                self.staged_pos = 0;
            }
            BlockOutcome::EndOfStream => self.state = ReaderState::Ended,
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.staged.clear();
        self.staged_pos = 0;

        if let ReaderState::Ready = self.state {
            let mut skipped = 0usize;
            while let BlockOutcome::Data(data) = self.decoder.decode_next(&mut self.reader)? {
                skipped += data.len();
            }
            if skipped > 0 {
                log::debug!("discarded {skipped} unread bytes");
            }
            self.state = ReaderState::Ended;
        }

        if self.decoder.descriptor().content_checksum {
            let mut stored = [0u8; 4];
            self.reader.read_exact(&mut stored)?;
            let expected = u32::from_le_bytes(stored);
            let computed = self.decoder.content_checksum();
            if expected != computed {
                return Err(FrameError::content_checksum(expected, computed));
            }
            log::debug!("content checksum verified: {computed:#010x}");
        }
        Ok(())
    }
}

impl<R: Read, C: BlockCodec, H: Checksum32 + Default> Read for FrameReader<R, C, H> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(self.read_chunk(buf)?)
    }
}
