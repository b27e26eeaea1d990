//! Sample metadata handling.
//!
//! Wraps the parsed metadata snapshot with a lookup by sample identifier and
//! the distinct-value enumeration used to populate filter suggestions.

use crate::error::Result;
use crate::io::source::read_snapshot_text;
use crate::loader::{parse_delimited, LoadedTable};
use crate::record::{is_missing, FieldAccess, MetadataRecord};
use log::warn;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;

/// Metadata fields offered as pick lists when filtering samples.
pub const DEFAULT_SUGGESTION_FIELDS: [&str; 9] = [
    "Study",
    "Country",
    "Group",
    "Stage",
    "Disease_location",
    "Gender",
    "Smoker",
    "AJCC",
    "fobt",
];

/// Represents the metadata for every sample of a loaded snapshot.
#[derive(Debug, Clone, Default)]
pub struct MetadataIndex {
    headers: Vec<String>,
    records: Vec<MetadataRecord>,
    by_id: HashMap<String, usize>,
}

impl MetadataIndex {
    /// Creates an index over already-parsed records.
    pub fn new(table: LoadedTable<MetadataRecord>) -> Self {
        let mut by_id = HashMap::with_capacity(table.records.len());
        for (i, record) in table.records.iter().enumerate() {
            if record.id().is_empty() {
                warn!("Metadata row {} has an empty sample ID.", i + 1);
                continue;
            }
            if by_id.contains_key(record.id()) {
                warn!(
                    "Duplicate sample ID '{}' in metadata; keeping the first row.",
                    record.id()
                );
                continue;
            }
            by_id.insert(record.id().to_string(), i);
        }
        MetadataIndex {
            headers: table.headers,
            records: table.records,
            by_id,
        }
    }

    /// Parses metadata snapshot text.
    pub fn from_text(text: &str, delimiter: u8) -> Self {
        Self::new(parse_delimited(text, delimiter))
    }

    /// Metadata record for a sample, if present.
    pub fn get(&self, sample_id: &str) -> Option<&MetadataRecord> {
        self.by_id.get(sample_id).map(|&i| &self.records[i])
    }

    pub fn contains(&self, sample_id: &str) -> bool {
        self.by_id.contains_key(sample_id)
    }

    /// All records in snapshot order.
    pub fn records(&self) -> &[MetadataRecord] {
        &self.records
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Returns the number of samples in the metadata
    pub fn sample_count(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct non-missing values of each requested field, sorted.
    ///
    /// Empty cells and the `NA` sentinel are left out. Fields that no record
    /// carries map to an empty set.
    pub fn distinct_values<S: AsRef<str>>(&self, fields: &[S]) -> BTreeMap<String, BTreeSet<String>> {
        fields
            .iter()
            .map(|field| {
                let field = field.as_ref();
                let values: BTreeSet<String> = self
                    .records
                    .iter()
                    .filter_map(|record| record.field(field))
                    .filter(|value| !is_missing(value))
                    .map(str::to_string)
                    .collect();
                (field.to_string(), values)
            })
            .collect()
    }
}

/// Loads metadata from a snapshot file.
///
/// # Arguments
///
/// * `path` - Path to the metadata snapshot (optionally compressed)
/// * `delimiter` - Column separator
///
/// # Returns
///
/// * `Result<MetadataIndex>` - Index over the samples, empty if the file has no header
pub fn load_metadata(path: &Path, delimiter: u8) -> Result<MetadataIndex> {
    let text = read_snapshot_text(path)?;
    Ok(MetadataIndex::from_text(&text, delimiter))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    fn create_test_metadata_file(path: &Path, content: &str) {
        let mut file = File::create(path).unwrap();
        writeln!(file, "{}", content).unwrap();
    }

    #[test]
    fn test_load_metadata_basic() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("metadata.csv");
        create_test_metadata_file(
            &file_path,
            "ID,Study,Country,Gender,Batch\nS1,Zeller,France,male,B1\nS2,Yu,China,NA,B1\nS3,Zeller,France,female,B2",
        );

        let metadata = load_metadata(&file_path, b',').unwrap();

        assert_eq!(metadata.sample_count(), 3);
        assert!(metadata.contains("S2"));
        assert!(!metadata.contains("S9"));
        assert_eq!(metadata.get("S1").unwrap().fields.country, "France");
        assert_eq!(metadata.get("S3").unwrap().field("Batch"), Some("B2"));
        assert!(metadata.get("S9").is_none());
    }

    #[test]
    fn test_distinct_values_skip_missing() {
        let metadata = MetadataIndex::from_text(
            "ID,Country,Gender,Smoker\nS1,USA,male,NA\nS2,China,NA,\nS3,USA,female,yes\n",
            b',',
        );

        let values = metadata.distinct_values(&["Country", "Gender", "Smoker", "Nope"]);

        let countries: Vec<&String> = values["Country"].iter().collect();
        assert_eq!(countries, vec!["China", "USA"]);
        let genders: Vec<&String> = values["Gender"].iter().collect();
        assert_eq!(genders, vec!["female", "male"]);
        assert_eq!(values["Smoker"].len(), 1);
        assert!(values["Nope"].is_empty());
    }

    #[test]
    fn test_duplicate_ids_keep_first() {
        let metadata = MetadataIndex::from_text("ID,Country\nS1,USA\nS1,China\n", b',');
        assert_eq!(metadata.sample_count(), 2);
        assert_eq!(metadata.get("S1").unwrap().fields.country, "USA");
    }

    #[test]
    fn test_missing_header_is_empty() {
        let metadata = MetadataIndex::from_text("", b',');
        assert!(metadata.is_empty());
        assert!(!metadata.contains(""));
    }
}
