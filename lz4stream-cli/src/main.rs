//! lz4stream CLI - LZ4 frame compression for files
//!
//! Compresses `FILE` to `FILE.lz4`, or with `-d` restores `FILE.lz4` to `FILE`.

mod utils;

use clap::Parser;
use lz4stream::{
    BlockMaxSize, CompressionLevel, FrameDescriptor, FrameError, FrameReader, FrameWriter,
    HEADER_SIZE,
};
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};
use utils::{
    ProgressReader, compressed_path, create_progress_bar, decompressed_path, format_ratio,
    open_output, read_full,
};

#[derive(Parser)]
#[command(name = "lz4stream")]
#[command(author, version, about = "LZ4 frame compression for files")]
#[command(long_about = "
Compresses each FILE into the LZ4 frame format, writing FILE.lz4 next to it.
Input files are never removed.

Examples:
  lz4stream data.txt                 # writes data.txt.lz4
  lz4stream -d data.txt.lz4          # writes data.txt
  lz4stream -l 0 -B 4 data.bin       # store only, 64 KB blocks
  lz4stream -d -c data.txt.lz4 | less
  lz4stream -t data.txt.lz4          # verify checksums only
")]
struct Cli {
    /// Files to process
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Decompress instead of compressing
    #[arg(short, long, conflicts_with = "test")]
    decompress: bool,

    /// Decompress and verify, discarding the output
    #[arg(short, long)]
    test: bool,

    /// Compression level (0 stores blocks uncompressed, 7-9 search for longer matches)
    #[arg(short, long, default_value_t = 6, value_parser = clap::value_parser!(u32).range(0..=9))]
    level: u32,

    /// Block size code: 4 = 64 KB, 5 = 256 KB, 6 = 1 MB, 7 = 4 MB
    #[arg(short = 'B', long = "block-size", default_value_t = 7, value_parser = clap::value_parser!(u8).range(4..=7))]
    block_size: u8,

    /// Append a checksum to every block
    #[arg(long)]
    block_checksum: bool,

    /// Do not append a checksum of the whole content
    #[arg(long)]
    no_content_checksum: bool,

    /// Write to standard output
    #[arg(short = 'c', long)]
    stdout: bool,

    /// Overwrite existing output files
    #[arg(short, long)]
    force: bool,

    /// Show verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Hide the progress bar
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    fn descriptor(&self) -> Result<FrameDescriptor, Box<dyn std::error::Error>> {
        let block_max_size = BlockMaxSize::from_code(self.block_size)
            .ok_or_else(|| format!("invalid block size code: {}", self.block_size))?;
        Ok(FrameDescriptor::new()
            .with_block_checksum(self.block_checksum)
            .with_content_checksum(!self.no_content_checksum)
            .with_block_max_size(block_max_size))
    }
}

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let mut failed = false;
    for file in &cli.files {
        let result = if cli.test {
            cmd_test(file, &cli)
        } else if cli.decompress {
            cmd_decompress(file, &cli)
        } else {
            cmd_compress(file, &cli)
        };

        if let Err(e) = result {
            eprintln!("Error: {}: {}", file.display(), e);
            failed = true;
        }
    }

    if failed {
        std::process::exit(1);
    }
}

fn cmd_compress(input: &Path, cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let level = CompressionLevel::new(cli.level)?;
    let desc = cli.descriptor()?;

    let file = File::open(input)?;
    let input_size = file.metadata()?.len();
    let pb = create_progress_bar(input_size, !cli.quiet);
    let mut source = ProgressReader::new(file, pb.clone());

    let output_path = (!cli.stdout).then(|| compressed_path(input));
    let sink = open_output(output_path.as_deref(), cli.force)?;
    let mut writer = FrameWriter::with_descriptor(CountingWriter::new(sink), level, desc);

    // One full block per write.
    let mut buf = vec![0u8; desc.block_capacity()];
    loop {
        let n = read_full(&mut source, &mut buf)?;
        if n == 0 {
            break;
        }
        writer.write_all(&buf[..n])?;
        if n < buf.len() {
            break;
        }
    }
    writer.close()?;
    pb.finish_and_clear();

    let written = writer.get_ref().count;
    if cli.verbose {
        let target = output_path
            .as_deref()
            .map_or_else(|| "(stdout)".to_string(), |p| p.display().to_string());
        eprintln!(
            "{} -> {}: {} -> {} bytes ({})",
            input.display(),
            target,
            input_size,
            written,
            format_ratio(input_size, written)
        );
    }
    Ok(())
}

fn cmd_decompress(input: &Path, cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let output_path = if cli.stdout {
        None
    } else {
        Some(decompressed_path(input).ok_or("unknown suffix, expected .lz4")?)
    };

    let file = File::open(input)?;
    let input_size = file.metadata()?.len();
    let pb = create_progress_bar(input_size, !cli.quiet);
    let source = BufReader::new(ProgressReader::new(file, pb.clone()));
    let mut reader = FrameReader::new(source)?;
    log::debug!("{}: {:?}", input.display(), reader.descriptor());

    let mut sink = open_output(output_path.as_deref(), cli.force)?;
    let result = io::copy(&mut reader, &mut sink)
        .map_err(FrameError::from)
        .and_then(|written| reader.close().map(|()| written))
        .and_then(|written| sink.flush().map(|()| written).map_err(Into::into));
    drop(sink);
    pb.finish_and_clear();

    let written = match result {
        Ok(written) => written,
        Err(e) => {
            if let Some(path) = &output_path {
                remove_partial(path);
            }
            return Err(e.into());
        }
    };

    if cli.verbose {
        let target = output_path
            .as_deref()
            .map_or_else(|| "(stdout)".to_string(), |p| p.display().to_string());
        eprintln!(
            "{} -> {}: {} -> {} bytes",
            input.display(),
            target,
            input_size,
            written
        );
    }
    Ok(())
}

fn cmd_test(input: &Path, cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let file = File::open(input)?;
    let input_size = file.metadata()?.len();
    if input_size < HEADER_SIZE as u64 {
        return Err(format!("file too short for a frame ({input_size} bytes)").into());
    }
    let pb = create_progress_bar(input_size, !cli.quiet);
    let source = BufReader::new(ProgressReader::new(file, pb.clone()));
    let mut reader = FrameReader::new(source)?;

    let content_size = io::copy(&mut reader, &mut io::sink())?;
    reader.close()?;
    pb.finish_and_clear();

    let desc = reader.descriptor();
    println!(
        "{}: OK ({} bytes, {} KB blocks{}{})",
        input.display(),
        content_size,
        desc.block_capacity() / 1024,
        if desc.block_checksum {
            ", block checksums"
        } else {
            ""
        },
        if desc.content_checksum {
            ", content checksum"
        } else {
            ""
        }
    );
    Ok(())
}

/// Delete an output file left incomplete by a failed decompression.
fn remove_partial(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => log::warn!("removed incomplete output {}", path.display()),
        Err(e) => log::warn!("could not remove incomplete output {}: {}", path.display(), e),
    }
}

/// Write adapter counting the bytes passed through.
struct CountingWriter<W> {
    inner: W,
    count: u64,
}

impl<W: Write> CountingWriter<W> {
    fn new(inner: W) -> Self {
        Self { inner, count: 0 }
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.count += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
