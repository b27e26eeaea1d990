//! Snapshot sources.
//!
//! A session needs the text of two snapshots, fetched once. Files may be
//! plain or compressed with gzip, bzip2 or zstd; the codec is picked from
//! the file extension.

use crate::error::Result;
use bzip2::read::BzDecoder;
use flate2::read::MultiGzDecoder;
use log::{info, warn};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

/// Which of the two snapshots is being fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotKind {
    Primary,
    Metadata,
}

impl SnapshotKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SnapshotKind::Primary => "primary",
            SnapshotKind::Metadata => "metadata",
        }
    }
}

/// Anything that can hand over the raw text of a snapshot.
pub trait SnapshotSource {
    fn fetch(&self, kind: SnapshotKind) -> Result<String>;
}

/// Snapshots read from files on disk.
#[derive(Debug, Clone)]
pub struct FileSource {
    pub primary: PathBuf,
    pub metadata: PathBuf,
}

impl FileSource {
    pub fn new(primary: impl Into<PathBuf>, metadata: impl Into<PathBuf>) -> Self {
        FileSource {
            primary: primary.into(),
            metadata: metadata.into(),
        }
    }
}

impl SnapshotSource for FileSource {
    fn fetch(&self, kind: SnapshotKind) -> Result<String> {
        let path = match kind {
            SnapshotKind::Primary => &self.primary,
            SnapshotKind::Metadata => &self.metadata,
        };
        info!("Reading {} snapshot from {}", kind.as_str(), path.display());
        read_snapshot_text(path)
    }
}

/// Snapshots already held in memory.
#[derive(Debug, Clone, Default)]
pub struct TextSource {
    pub primary: String,
    pub metadata: String,
}

impl TextSource {
    pub fn new(primary: impl Into<String>, metadata: impl Into<String>) -> Self {
        TextSource {
            primary: primary.into(),
            metadata: metadata.into(),
        }
    }
}

impl SnapshotSource for TextSource {
    fn fetch(&self, kind: SnapshotKind) -> Result<String> {
        Ok(match kind {
            SnapshotKind::Primary => self.primary.clone(),
            SnapshotKind::Metadata => self.metadata.clone(),
        })
    }
}

/// Reads a snapshot file to a string, decompressing by extension.
///
/// Bytes that are not valid UTF-8 are replaced with U+FFFD.
pub fn read_snapshot_text(path: &Path) -> Result<String> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase);

    let mut decoded: Box<dyn Read> = match extension.as_deref() {
        Some("gz") => Box::new(MultiGzDecoder::new(reader)),
        Some("bz2") => Box::new(BzDecoder::new(reader)),
        Some("zst") => Box::new(zstd::stream::read::Decoder::new(reader)?),
        _ => Box::new(reader),
    };

    let mut bytes = Vec::new();
    decoded.read_to_end(&mut bytes)?;
    match String::from_utf8(bytes) {
        Ok(text) => Ok(text),
        Err(e) => {
            warn!(
                "{} is not valid UTF-8 ({}); replacing invalid bytes.",
                path.display(),
                e.utf8_error()
            );
            Ok(String::from_utf8_lossy(e.as_bytes()).into_owned())
        }
    }
}
