//! Browse configuration.
//!
//! Snapshot locations, the column separator, and the column lists used for
//! search and filter suggestions, stored as a JSON file. Missing keys take
//! their defaults.

use crate::error::{BrowseError, Result};
use crate::metadata::DEFAULT_SUGGESTION_FIELDS;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Columns searched by the free-text table filter.
pub const DEFAULT_SEARCH_COLUMNS: [&str; 8] = [
    "Loop", "Length", "phylum", "class", "order", "family", "genus", "species",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowseConfig {
    /// Primary dataset snapshot.
    pub primary_path: Option<PathBuf>,
    /// Sample metadata snapshot.
    pub metadata_path: Option<PathBuf>,
    /// Single-character column separator.
    pub delimiter: char,
    pub search_columns: Vec<String>,
    pub suggestion_fields: Vec<String>,
}

impl Default for BrowseConfig {
    fn default() -> Self {
        Self {
            primary_path: None,
            metadata_path: None,
            delimiter: ',',
            search_columns: DEFAULT_SEARCH_COLUMNS.iter().map(|s| s.to_string()).collect(),
            suggestion_fields: DEFAULT_SUGGESTION_FIELDS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl BrowseConfig {
    /// The delimiter as a byte, as the CSV reader wants it.
    pub fn delimiter_byte(&self) -> Result<u8> {
        if self.delimiter.is_ascii() {
            Ok(self.delimiter as u8)
        } else {
            Err(BrowseError::ConfigError(format!(
                "Delimiter '{}' is not a single ASCII character",
                self.delimiter
            )))
        }
    }
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<BrowseConfig> {
    let contents = std::fs::read_to_string(path)?;
    let config: BrowseConfig = serde_json::from_str(&contents)
        .map_err(|e| BrowseError::ConfigError(format!("Failed to parse config: {}", e)))?;
    config.delimiter_byte()?;
    Ok(config)
}

pub fn save_config<P: AsRef<Path>>(path: P, config: &BrowseConfig) -> Result<()> {
    let contents = serde_json::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}
