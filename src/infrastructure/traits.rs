//! I/O boundary traits for testability
//!
//! These traits abstract external I/O operations, allowing services
//! to be tested with in-memory implementations.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::domain::Sequence;

/// Filesystem abstraction for testability.
pub trait FileSystem: Send + Sync {
    /// Read file contents to string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Write string content to file.
    fn write(&self, path: &Path, content: &str) -> io::Result<()>;
}

/// Malformed content in an input file.
///
/// Travels as the payload of an `InvalidData` I/O error so readers keep the
/// plain `io::Result` signature.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}: {message}", path.display())]
pub struct FormatError {
    pub path: PathBuf,
    pub message: String,
}

/// Supplies root sequences from some external source.
pub trait SequenceReader: Send + Sync {
    /// Read the `index`-th record (0-based) from `source`.
    ///
    /// A missing record is `NotFound`; malformed input is `InvalidData`.
    fn read(&self, source: &Path, index: usize) -> io::Result<Sequence>;
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Real filesystem implementation.
#[derive(Debug, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        std::fs::write(path, content)
    }
}

/// FASTA reader on top of a [`FileSystem`].
///
/// Header lines start with `>`; `;` lines are comments. Sequence lines of a
/// record are concatenated with whitespace removed and upper-cased.
pub struct FastaReader {
    fs: Arc<dyn FileSystem>,
}

impl FastaReader {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }
}

impl SequenceReader for FastaReader {
    fn read(&self, source: &Path, index: usize) -> io::Result<Sequence> {
        debug!("read fasta: {} #{}", source.display(), index);
        let content = self.fs.read_to_string(source)?;
        parse_fasta(&content, index).map_err(|e| match e.kind() {
            io::ErrorKind::InvalidData => io::Error::new(
                io::ErrorKind::InvalidData,
                FormatError {
                    path: source.to_path_buf(),
                    message: e.to_string(),
                },
            ),
            _ => e,
        })
    }
}

/// Extract record `index` from FASTA text.
pub fn parse_fasta(content: &str, index: usize) -> io::Result<Sequence> {
    let mut records = 0;
    let mut header: Option<&str> = None;
    let mut symbols: Vec<u8> = Vec::new();
    let mut in_target = false;

    for (line_no, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with(';') {
            continue;
        }
        if let Some(h) = line.strip_prefix('>') {
            if in_target {
                break;
            }
            in_target = records == index;
            if in_target {
                header = Some(h.trim());
            }
            records += 1;
            continue;
        }
        if records == 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("line {}: sequence data before first '>' header", line_no + 1),
            ));
        }
        if in_target {
            symbols.extend(
                line.bytes()
                    .filter(|b| !b.is_ascii_whitespace())
                    .map(|b| b.to_ascii_uppercase()),
            );
        }
    }

    match header {
        Some(h) => {
            let sequence = Sequence::new(symbols);
            Ok(if h.is_empty() { sequence } else { sequence.with_info(h) })
        }
        None => Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("record {} not found ({} records)", index, records),
        )),
    }
}
