//! Round-trip and failure-mode tests for the streaming reader and writer.

use lz4stream::{
    BlockCodec, BlockMaxSize, Checksum32, CompressionLevel, FrameDescriptor, FrameError,
    FrameReader, FrameWriter, Lz4Codec, Result, compress_with_options, decompress,
};
use proptest::prelude::*;
use std::cell::Cell;
use std::io::{self, Read, Write};
use std::rc::Rc;

/// Rotating sum of consumed bytes. Cheap to predict and unrelated to XXH32,
/// so a frame that decodes with it cannot be checking XXH32 by accident.
#[derive(Debug, Default)]
struct RotSum(u32);

impl Checksum32 for RotSum {
    fn update(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 = self.0.rotate_left(5) ^ u32::from(b);
        }
    }

    fn finish(&self) -> u32 {
        self.0
    }

    fn reset(&mut self) {
        self.0 = 0;
    }
}

/// Codec that records how many times it was asked to decompress.
#[derive(Debug, Default)]
struct Spy {
    inner: Lz4Codec,
    decompress_calls: Rc<Cell<usize>>,
}

impl BlockCodec for Spy {
    fn compress(&mut self, src: &[u8], dst: &mut [u8]) -> Option<usize> {
        self.inner.compress(src, dst)
    }

    fn decompress(&mut self, src: &[u8], dst: &mut [u8]) -> Result<usize> {
        self.decompress_calls.set(self.decompress_calls.get() + 1);
        self.inner.decompress(src, dst)
    }
}

fn frame_in_chunks(
    data: &[u8],
    chunk: usize,
    level: CompressionLevel,
    desc: FrameDescriptor,
) -> Vec<u8> {
    let mut writer = FrameWriter::with_descriptor(Vec::new(), level, desc);
    for piece in data.chunks(chunk.max(1)) {
        writer.write_all(piece).expect("write failed");
    }
    writer.close().expect("close failed");
    writer.into_inner()
}

fn sample_text(len: usize) -> Vec<u8> {
    b"It was the best of times, it was the worst of times, it was the age of wisdom, "
        .iter()
        .copied()
        .cycle()
        .take(len)
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_roundtrip_arbitrary_bytes(
        data in prop::collection::vec(any::<u8>(), 0..20_000),
        chunk in 1usize..5_000,
        level in 0u32..=9,
    ) {
        let level = CompressionLevel::new(level).unwrap();
        let frame = frame_in_chunks(&data, chunk, level, FrameDescriptor::new());
        prop_assert_eq!(decompress(&frame).unwrap(), data);
    }

    #[test]
    fn prop_roundtrip_all_options(
        repeat in 0usize..3_000,
        block_checksum in any::<bool>(),
        content_checksum in any::<bool>(),
        code in 4u8..=5,
    ) {
        let data = sample_text(repeat * 40);
        let desc = FrameDescriptor::new()
            .with_block_checksum(block_checksum)
            .with_content_checksum(content_checksum)
            .with_block_max_size(BlockMaxSize::from_code(code).unwrap());
        let frame = compress_with_options(&data, CompressionLevel::DEFAULT, desc).unwrap();

        let mut reader = FrameReader::new(&frame[..]).unwrap();
        prop_assert_eq!(*reader.descriptor(), desc);
        let mut out = Vec::new();
        reader.read_to_end(&mut out).unwrap();
        reader.close().unwrap();
        prop_assert_eq!(out, data);
    }

    #[test]
    fn prop_garbage_never_panics(data in prop::collection::vec(any::<u8>(), 0..512)) {
        let _ = decompress(&data);
    }
}

#[test]
fn test_io_copy_roundtrip() {
    let data = sample_text(3 * 1024 * 1024);
    let desc = FrameDescriptor::new().with_block_max_size(BlockMaxSize::Size1MB);

    let mut writer = FrameWriter::with_descriptor(Vec::new(), CompressionLevel::FAST, desc);
    io::copy(&mut &data[..], &mut writer).unwrap();
    writer.close().unwrap();
    let frame = writer.into_inner();
    assert!(frame.len() < data.len() / 10);

    let mut reader = FrameReader::new(&frame[..]).unwrap();
    let mut out = Vec::new();
    io::copy(&mut reader, &mut out).unwrap();
    reader.close().unwrap();
    assert_eq!(out, data);
}

#[test]
fn test_custom_checksum_end_to_end() {
    let data = sample_text(10_000);
    let desc = FrameDescriptor::new().with_block_checksum(true);

    let mut writer: FrameWriter<Vec<u8>, Lz4Codec, RotSum> =
        FrameWriter::with_codec(Vec::new(), Lz4Codec::new(CompressionLevel::DEFAULT), desc);
    writer.write_all(&data).unwrap();
    writer.close().unwrap();
    let frame = writer.into_inner();

    let mut reader: FrameReader<&[u8], Lz4Codec, RotSum> =
        FrameReader::with_codec(&frame[..], Lz4Codec::default()).unwrap();
    let mut out = Vec::new();
    reader.read_to_end(&mut out).unwrap();
    reader.close().unwrap();
    assert_eq!(out, data);

    // The standard reader checks XXH32 and rejects the header.
    assert!(matches!(
        FrameReader::new(&frame[..]),
        Err(FrameError::DescriptorChecksumMismatch { .. })
    ));
}

#[test]
fn test_custom_checksum_detects_block_damage() {
    let desc = FrameDescriptor::new()
        .with_block_checksum(true)
        .with_content_checksum(false);
    let mut writer: FrameWriter<Vec<u8>, Lz4Codec, RotSum> =
        FrameWriter::with_codec(Vec::new(), Lz4Codec::new(CompressionLevel::NONE), desc);
    writer.write_all(b"abcdefgh").unwrap();
    writer.close().unwrap();
    let mut frame = writer.into_inner();
    frame[12] ^= 0x40;

    let mut reader: FrameReader<&[u8], Lz4Codec, RotSum> =
        FrameReader::with_codec(&frame[..], Lz4Codec::default()).unwrap();
    let mut out = Vec::new();
    let err = reader.read_to_end(&mut out).unwrap_err();
    assert!(matches!(
        FrameError::from(err),
        FrameError::BlockChecksumMismatch { .. }
    ));
}

#[test]
fn test_oversized_block_never_reaches_codec() {
    let desc = FrameDescriptor::new().with_block_max_size(BlockMaxSize::Size64KB);
    let mut frame = desc.encode::<lz4stream::Xxh32>().to_vec();
    frame.extend_from_slice(&(64 * 1024 + 1u32).to_le_bytes());
    frame.extend_from_slice(&vec![0u8; 64 * 1024 + 1]);

    let spy = Spy::default();
    let calls = Rc::clone(&spy.decompress_calls);
    let mut reader: FrameReader<&[u8], Spy> = FrameReader::with_codec(&frame[..], spy).unwrap();

    let mut buf = [0u8; 16];
    let err = reader.read_chunk(&mut buf).unwrap_err();
    assert!(matches!(
        err,
        FrameError::InvalidBlockSize {
            size: 65537,
            max: 65536
        }
    ));
    assert!(reader.read_chunk(&mut buf).is_err());
    assert!(reader.close().is_err());
    assert_eq!(calls.get(), 0);
}

#[test]
fn test_truncation_anywhere_is_reported() {
    let data = sample_text(5_000);
    let desc = FrameDescriptor::new().with_block_checksum(true);
    let frame = frame_in_chunks(&data, 1_000, CompressionLevel::DEFAULT, desc);

    for len in 7..frame.len() {
        let result = decompress(&frame[..len]);
        assert!(
            matches!(result, Err(FrameError::TruncatedStream)),
            "len {len}: {result:?}"
        );
    }
}

#[test]
fn test_body_corruption_detected() {
    let data = sample_text(50_000);
    let frame = frame_in_chunks(&data, 10_000, CompressionLevel::NONE, FrameDescriptor::new());

    // Stored blocks: flipping a body byte changes the content silently until
    // the content checksum is checked.
    let mut damaged = frame.clone();
    damaged[20] ^= 0x01;
    assert!(matches!(
        decompress(&damaged),
        Err(FrameError::ContentChecksumMismatch { .. })
    ));
}

#[test]
fn test_read_after_error_replays() {
    let mut frame = frame_in_chunks(
        b"payload",
        7,
        CompressionLevel::DEFAULT,
        FrameDescriptor::new(),
    );
    // Turn the stored block into a compressed one with garbage content.
    frame[10] = 0x00;

    let mut reader = FrameReader::new(&frame[..]).unwrap();
    let mut buf = [0u8; 32];
    let first = reader.read(&mut buf).unwrap_err();
    let second = reader.read(&mut buf).unwrap_err();
    assert_eq!(first.kind(), second.kind());
    assert_eq!(first.to_string(), second.to_string());
}

#[test]
fn test_level_out_of_range() {
    assert!(matches!(
        CompressionLevel::new(10),
        Err(FrameError::InvalidLevel { level: 10 })
    ));
}

#[test]
fn test_best_level_frames_no_larger_than_fast() {
    let mut data = Vec::new();
    for i in 0..4000u32 {
        data.extend_from_slice(format!("row {:04} {} | ", i % 900, i % 17).as_bytes());
    }
    let desc = FrameDescriptor::new().with_block_max_size(BlockMaxSize::Size64KB);

    let fast = compress_with_options(&data, CompressionLevel::FAST, desc).unwrap();
    let best = compress_with_options(&data, CompressionLevel::BEST, desc).unwrap();
    assert!(best.len() <= fast.len(), "best: {}, fast: {}", best.len(), fast.len());
    assert_ne!(best, fast);

    assert_eq!(decompress(&best).unwrap(), data);
    // Same content, same trailing checksum.
    assert_eq!(best[best.len() - 4..], fast[fast.len() - 4..]);
}
