//! Error type for the I/O edges of the crate.
//!
//! The query operations themselves never fail: malformed rows, missing
//! headers and non-numeric cells all degrade to empty or zero results.
//! Only fetching snapshots, reading configuration and writing output can
//! produce a `BrowseError`.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BrowseError {
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Snapshot error: {0}")]
    SnapshotError(String),
}

pub type Result<T> = std::result::Result<T, BrowseError>;
