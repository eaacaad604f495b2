//! Helpers shared by the compress, decompress and test commands.

use indicatif::{ProgressBar, ProgressStyle};
use std::ffi::OsString;
use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

/// File extension of compressed files.
pub const LZ4_EXTENSION: &str = "lz4";

/// Create a byte-count progress bar, or a hidden one when disabled.
pub fn create_progress_bar(len: u64, enable: bool) -> ProgressBar {
    if !enable {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} {msg}")
            .expect("progress bar template is valid")
            .progress_chars("█▓▒░ "),
    );
    pb
}

/// Reader that advances a progress bar by the bytes it returns.
pub struct ProgressReader<R> {
    inner: R,
    pb: ProgressBar,
}

impl<R: Read> ProgressReader<R> {
    pub fn new(inner: R, pb: ProgressBar) -> Self {
        Self { inner, pb }
    }
}

impl<R: Read> Read for ProgressReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.pb.inc(n as u64);
        Ok(n)
    }
}

/// `FILE` -> `FILE.lz4`.
pub fn compressed_path(input: &Path) -> PathBuf {
    let mut name = OsString::from(input.as_os_str());
    name.push(".");
    name.push(LZ4_EXTENSION);
    PathBuf::from(name)
}

/// `FILE.lz4` -> `FILE`; `None` when the input lacks the `.lz4` suffix.
pub fn decompressed_path(input: &Path) -> Option<PathBuf> {
    let is_lz4 = input
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(LZ4_EXTENSION));
    if !is_lz4 {
        return None;
    }
    let stem = input.file_stem()?;
    Some(input.with_file_name(stem))
}

/// Open the destination: stdout, or a new file that must not exist unless
/// `force` is set.
pub fn open_output(
    path: Option<&Path>,
    force: bool,
) -> Result<BufWriter<Box<dyn Write>>, Box<dyn std::error::Error>> {
    let sink: Box<dyn Write> = match path {
        None => Box::new(io::stdout().lock()),
        Some(path) => {
            if !force && path.exists() {
                return Err(format!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                )
                .into());
            }
            Box::new(File::create(path)?)
        }
    };
    Ok(BufWriter::new(sink))
}

/// Fill `buf` from `reader`, stopping early only at end of input.
pub fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Format a compression ratio as a percentage of the original size.
pub fn format_ratio(original: u64, compressed: u64) -> String {
    if original == 0 {
        return "-".to_string();
    }
    format!("{:.1}%", compressed as f64 / original as f64 * 100.0)
}
