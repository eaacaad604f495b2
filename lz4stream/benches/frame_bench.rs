//! Performance benchmarks for lz4stream
//!
//! This benchmark suite evaluates:
//! - Frame compression/decompression throughput (MB/s)
//! - Performance across data patterns
//! - Cost of block and content checksums
//! - Streaming with small reads and writes

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use lz4stream::{
    BlockMaxSize, CompressionLevel, FrameDescriptor, FrameReader, FrameWriter, compress,
    compress_with_options, decompress,
};
use std::hint::black_box;
use std::io::{Read, Write};

/// Type alias for pattern generator functions
type PatternGenerator = fn(usize) -> Vec<u8>;

/// Generate test data patterns for benchmarking
mod test_data {
    /// Uniform data - all bytes are the same (best compression)
    pub fn uniform(size: usize) -> Vec<u8> {
        vec![0xAA; size]
    }

    /// Random data - no patterns, every block is stored raw
    pub fn random(size: usize) -> Vec<u8> {
        let mut data = Vec::with_capacity(size);
        let mut seed: u64 = 0x123456789ABCDEF0;
        for _ in 0..size {
            // Linear congruential generator
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
            data.push((seed >> 32) as u8);
        }
        data
    }

    /// Text-like data - realistic scenario
    pub fn text_like(size: usize) -> Vec<u8> {
        let text = b"The quick brown fox jumps over the lazy dog. \
                     Pack my box with five dozen liquor jugs. \
                     How vexingly quick daft zebras jump! \
                     Lorem ipsum dolor sit amet, consectetur adipiscing elit. ";
        text.iter().copied().cycle().take(size).collect()
    }
}

/// Standard data sizes for benchmarking
mod data_sizes {
    pub const SMALL: usize = 10 * 1024; // 10 KB
    pub const MEDIUM: usize = 100 * 1024; // 100 KB
    pub const LARGE: usize = 1024 * 1024; // 1 MB
}

/// Benchmark compression across data patterns
fn bench_compression_data_types(c: &mut Criterion) {
    let mut group = c.benchmark_group("compression_data_types");

    let size = data_sizes::MEDIUM;
    let patterns: [(&str, PatternGenerator); 3] = [
        ("uniform", test_data::uniform),
        ("random", test_data::random),
        ("text", test_data::text_like),
    ];

    for (name, generator) in patterns {
        let data = generator(size);
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), &data, |b, data| {
            b.iter(|| {
                let compressed = compress(black_box(data), CompressionLevel::DEFAULT).unwrap();
                black_box(compressed);
            });
        });
    }

    group.finish();
}

/// Benchmark decompression across sizes
fn bench_decompression_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("decompression_sizes");

    for size in [data_sizes::SMALL, data_sizes::MEDIUM, data_sizes::LARGE] {
        let data = test_data::text_like(size);
        let compressed = compress(&data, CompressionLevel::DEFAULT).unwrap();

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &compressed, |b, frame| {
            b.iter(|| {
                let decompressed = decompress(black_box(frame)).unwrap();
                black_box(decompressed);
            });
        });
    }

    group.finish();
}

/// Benchmark the cost of the optional checksums
fn bench_checksum_options(c: &mut Criterion) {
    let mut group = c.benchmark_group("checksum_options");

    let size = data_sizes::LARGE;
    let data = test_data::text_like(size);
    let options = [
        ("none", false, false),
        ("content", false, true),
        ("block", true, false),
        ("both", true, true),
    ];

    for (name, block_checksum, content_checksum) in options {
        let desc = FrameDescriptor::new()
            .with_block_checksum(block_checksum)
            .with_content_checksum(content_checksum)
            .with_block_max_size(BlockMaxSize::Size256KB);
        let frame = compress_with_options(&data, CompressionLevel::DEFAULT, desc).unwrap();

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), &frame, |b, frame| {
            b.iter(|| {
                let decompressed = decompress(black_box(frame)).unwrap();
                black_box(decompressed);
            });
        });
    }

    group.finish();
}

/// Benchmark streaming with io::Read/io::Write in small pieces
fn bench_streaming(c: &mut Criterion) {
    let mut group = c.benchmark_group("streaming");

    let size = data_sizes::LARGE;
    let data = test_data::text_like(size);
    let frame = compress(&data, CompressionLevel::DEFAULT).unwrap();

    group.throughput(Throughput::Bytes(size as u64));
    group.bench_function("write_8k", |b| {
        b.iter(|| {
            let mut writer = FrameWriter::new(Vec::new(), CompressionLevel::DEFAULT);
            for chunk in data.chunks(8 * 1024) {
                writer.write_all(chunk).unwrap();
            }
            writer.close().unwrap();
            black_box(writer.into_inner());
        });
    });

    group.bench_function("read_4k", |b| {
        b.iter(|| {
            let mut reader = FrameReader::new(black_box(&frame[..])).unwrap();
            let mut buf = [0u8; 4096];
            let mut total = 0;
            loop {
                let n = reader.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                total += n;
            }
            reader.close().unwrap();
            black_box(total);
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_compression_data_types,
    bench_decompression_sizes,
    bench_checksum_options,
    bench_streaming,
);

criterion_main!(benches);
