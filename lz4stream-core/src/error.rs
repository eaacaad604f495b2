//! Error types for lz4stream operations.
//!
//! Each failure a frame reader or writer can hit maps to exactly one variant,
//! so callers can tell a corrupt stream apart from an unsupported feature or
//! a short read. The streams implement `std::io::Read`/`Write`, so errors
//! cross that boundary wrapped in an `io::Error` and can be recovered with
//! `FrameError::from`.

use std::fmt;
use std::io;
use thiserror::Error;

/// Optional frame features that are recognised but never decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    /// Blocks referencing data of previous blocks.
    DependentBlocks,
    /// Uncompressed content size stored in the descriptor.
    ContentSize,
    /// Preset dictionary identifier stored in the descriptor.
    Dictionary,
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Feature::DependentBlocks => "dependent blocks",
            Feature::ContentSize => "stream size",
            Feature::Dictionary => "dictionary",
        };
        f.write_str(name)
    }
}

/// The main error type for frame encoding and decoding.
#[derive(Debug, Error)]
pub enum FrameError {
    /// I/O error from the underlying byte source or sink.
    #[error("I/O error: {0}")]
    Io(#[source] io::Error),

    /// The stream does not start with the frame magic number.
    #[error("Invalid magic number: expected {expected:#010x}, found {found:#010x}")]
    InvalidMagic {
        /// Expected magic number.
        expected: u32,
        /// Magic number read from the stream.
        found: u32,
    },

    /// Descriptor version field is not 1.
    #[error("Unsupported frame version: {version}")]
    UnsupportedVersion {
        /// Version read from the FLG byte.
        version: u8,
    },

    /// Descriptor requests a feature this implementation does not support.
    #[error("Unsupported frame feature: {feature}")]
    UnsupportedFeature {
        /// The offending feature.
        feature: Feature,
    },

    /// A reserved descriptor bit is set.
    #[error("Reserved bits set in {field}")]
    ReservedBitsViolation {
        /// Descriptor byte holding the reserved bits.
        field: &'static str,
    },

    /// Block maximum size code below 4.
    #[error("Unsupported block size code: {code}")]
    UnsupportedBlockSize {
        /// 3-bit code read from the BD byte.
        code: u8,
    },

    /// Header checksum byte does not match FLG and BD.
    #[error("Descriptor checksum mismatch: expected {expected:#04x}, found {found:#04x}")]
    DescriptorChecksumMismatch {
        /// Checksum computed over the descriptor bytes.
        expected: u8,
        /// Checksum byte stored in the stream.
        found: u8,
    },

    /// Block length exceeds the capacity announced by the descriptor.
    #[error("Invalid block size: {size} exceeds maximum {max}")]
    InvalidBlockSize {
        /// Declared block length.
        size: usize,
        /// Block capacity from the descriptor.
        max: usize,
    },

    /// The stream ended in the middle of a framing field or block body.
    #[error("Truncated stream")]
    TruncatedStream,

    /// Stored block checksum does not match the block body.
    #[error("Block checksum mismatch: expected {expected:#010x}, computed {computed:#010x}")]
    BlockChecksumMismatch {
        /// Checksum stored after the block body.
        expected: u32,
        /// Checksum computed over the block body.
        computed: u32,
    },

    /// Stored content checksum does not match the decoded content.
    #[error("Content checksum mismatch: expected {expected:#010x}, computed {computed:#010x}")]
    ContentChecksumMismatch {
        /// Checksum stored after the end marker.
        expected: u32,
        /// Checksum computed over all decoded bytes.
        computed: u32,
    },

    /// The block codec rejected a compressed block.
    #[error("Corrupt block: {message}")]
    BlockCorrupt {
        /// Description reported by the codec.
        message: String,
    },

    /// Compression level outside 0..=9.
    #[error("Invalid compression level: {level}")]
    InvalidLevel {
        /// Requested level.
        level: u32,
    },

    /// The stream was already closed.
    #[error("Stream already closed")]
    StreamClosed,
}

/// Result type alias for lz4stream operations.
pub type Result<T> = std::result::Result<T, FrameError>;

impl FrameError {
    /// Create an invalid magic error.
    pub fn invalid_magic(expected: u32, found: u32) -> Self {
        Self::InvalidMagic { expected, found }
    }

    /// Create an unsupported feature error.
    pub fn unsupported(feature: Feature) -> Self {
        Self::UnsupportedFeature { feature }
    }

    /// Create a reserved bits error.
    pub fn reserved_bits(field: &'static str) -> Self {
        Self::ReservedBitsViolation { field }
    }

    /// Create an invalid block size error.
    pub fn invalid_block_size(size: usize, max: usize) -> Self {
        Self::InvalidBlockSize { size, max }
    }

    /// Create a block checksum mismatch error.
    pub fn block_checksum(expected: u32, computed: u32) -> Self {
        Self::BlockChecksumMismatch { expected, computed }
    }

    /// Create a content checksum mismatch error.
    pub fn content_checksum(expected: u32, computed: u32) -> Self {
        Self::ContentChecksumMismatch { expected, computed }
    }

    /// Create a corrupt block error.
    pub fn corrupt(message: impl Into<String>) -> Self {
        Self::BlockCorrupt {
            message: message.into(),
        }
    }

    /// Produce an equivalent error for replaying a cached failure.
    ///
    /// I/O errors are rebuilt from their kind and message since `io::Error`
    /// cannot be cloned.
    pub fn replay(&self) -> Self {
        match self {
            Self::Io(err) => Self::Io(io::Error::new(err.kind(), err.to_string())),
            Self::InvalidMagic { expected, found } => Self::invalid_magic(*expected, *found),
            Self::UnsupportedVersion { version } => Self::UnsupportedVersion { version: *version },
            Self::UnsupportedFeature { feature } => Self::unsupported(*feature),
            Self::ReservedBitsViolation { field } => Self::reserved_bits(*field),
            Self::UnsupportedBlockSize { code } => Self::UnsupportedBlockSize { code: *code },
            Self::DescriptorChecksumMismatch { expected, found } => {
                Self::DescriptorChecksumMismatch {
                    expected: *expected,
                    found: *found,
                }
            }
            Self::InvalidBlockSize { size, max } => Self::invalid_block_size(*size, *max),
            Self::TruncatedStream => Self::TruncatedStream,
            Self::BlockChecksumMismatch { expected, computed } => {
                Self::block_checksum(*expected, *computed)
            }
            Self::ContentChecksumMismatch { expected, computed } => {
                Self::content_checksum(*expected, *computed)
            }
            Self::BlockCorrupt { message } => Self::corrupt(message.clone()),
            Self::InvalidLevel { level } => Self::InvalidLevel { level: *level },
            Self::StreamClosed => Self::StreamClosed,
        }
    }
}

impl From<io::Error> for FrameError {
    fn from(err: io::Error) -> Self {
        // Unwrap errors that already crossed an io::Read/io::Write boundary.
        if err.get_ref().is_some_and(|inner| inner.is::<FrameError>()) {
            let kind = err.kind();
            return match err.into_inner().map(|inner| inner.downcast::<FrameError>()) {
                Some(Ok(frame)) => *frame,
                _ => Self::Io(kind.into()),
            };
        }
        if err.kind() == io::ErrorKind::UnexpectedEof {
            return Self::TruncatedStream;
        }
        Self::Io(err)
    }
}

impl From<FrameError> for io::Error {
    fn from(err: FrameError) -> Self {
        let kind = match &err {
            FrameError::Io(_) => None,
            FrameError::TruncatedStream => Some(io::ErrorKind::UnexpectedEof),
            FrameError::InvalidLevel { .. } | FrameError::StreamClosed => {
                Some(io::ErrorKind::InvalidInput)
            }
            _ => Some(io::ErrorKind::InvalidData),
        };
        match (kind, err) {
            (None, FrameError::Io(inner)) => inner,
            (Some(kind), err) => io::Error::new(kind, err),
            (None, err) => io::Error::other(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FrameError::invalid_magic(0x184D2204, 0xDEADBEEF);
        assert!(err.to_string().contains("Invalid magic"));
        assert!(err.to_string().contains("0xdeadbeef"));

        let err = FrameError::unsupported(Feature::Dictionary);
        assert_eq!(err.to_string(), "Unsupported frame feature: dictionary");

        let err = FrameError::content_checksum(1, 2);
        assert!(err.to_string().contains("Content checksum mismatch"));
    }

    #[test]
    fn test_unexpected_eof_is_truncation() {
        let io_err = io::Error::new(io::ErrorKind::UnexpectedEof, "short read");
        let err: FrameError = io_err.into();
        assert!(matches!(err, FrameError::TruncatedStream));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: FrameError = io_err.into();
        assert!(matches!(err, FrameError::Io(_)));
    }

    #[test]
    fn test_frame_error_survives_io_boundary() {
        let original = FrameError::block_checksum(0xAAAA_AAAA, 0xBBBB_BBBB);
        let io_err: io::Error = original.into();
        assert_eq!(io_err.kind(), io::ErrorKind::InvalidData);

        let back: FrameError = io_err.into();
        assert!(matches!(
            back,
            FrameError::BlockChecksumMismatch {
                expected: 0xAAAA_AAAA,
                computed: 0xBBBB_BBBB
            }
        ));
    }

    #[test]
    fn test_truncation_maps_to_unexpected_eof() {
        let io_err: io::Error = FrameError::TruncatedStream.into();
        assert_eq!(io_err.kind(), io::ErrorKind::UnexpectedEof);
        let back: FrameError = io_err.into();
        assert!(matches!(back, FrameError::TruncatedStream));
    }

    #[test]
    fn test_replay_preserves_variant() {
        let err = FrameError::Io(io::Error::new(io::ErrorKind::BrokenPipe, "gone"));
        let replayed = err.replay();
        match replayed {
            FrameError::Io(inner) => {
                assert_eq!(inner.kind(), io::ErrorKind::BrokenPipe);
                assert!(inner.to_string().contains("gone"));
            }
            other => panic!("unexpected variant: {other:?}"),
        }

        let err = FrameError::invalid_block_size(5_000_000, 4_194_304);
        assert!(matches!(
            err.replay(),
            FrameError::InvalidBlockSize {
                size: 5_000_000,
                max: 4_194_304
            }
        ));
    }
}
