//! Delimited-text snapshot parsing.
//!
//! The first row of a snapshot names the columns; every following non-blank
//! row becomes one record keyed by those names. Parsing never fails: a
//! snapshot without a header yields no records, and unreadable rows are
//! skipped with a warning.

use crate::record::{FromRow, RawRow, ID_COLUMN};
use csv::{ReaderBuilder, StringRecord};
use log::{debug, info, warn};

/// Records parsed from one snapshot, together with its header row.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedTable<T> {
    pub headers: Vec<String>,
    pub records: Vec<T>,
}

impl<T> LoadedTable<T> {
    pub fn empty() -> Self {
        LoadedTable {
            headers: Vec::new(),
            records: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Header names with the identifier column moved to the front, the
    /// order in which tables are displayed.
    pub fn display_columns(&self) -> Vec<String> {
        let mut columns = Vec::with_capacity(self.headers.len());
        if self.headers.iter().any(|h| h == ID_COLUMN) {
            columns.push(ID_COLUMN.to_string());
        }
        columns.extend(self.headers.iter().filter(|h| *h != ID_COLUMN).cloned());
        columns
    }
}

fn is_blank(record: &StringRecord) -> bool {
    record.len() <= 1 && record.get(0).map_or(true, |f| f.trim().is_empty())
}

/// Parses comma-separated snapshot text.
pub fn load_records<T: FromRow>(text: &str) -> LoadedTable<T> {
    parse_delimited(text, b',')
}

/// Parses snapshot text split on `delimiter` into typed records.
pub fn parse_delimited<T: FromRow>(text: &str, delimiter: u8) -> LoadedTable<T> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = match rdr.headers() {
        Ok(h) => h
            .iter()
            .map(|name| name.trim_start_matches('\u{feff}').trim().to_string())
            .collect(),
        Err(e) => {
            warn!("Could not read snapshot header row: {}", e);
            return LoadedTable::empty();
        }
    };

    if headers.iter().all(|h| h.is_empty()) {
        warn!("Snapshot has no header row; treating it as empty.");
        return LoadedTable::empty();
    }

    let mut records = Vec::new();
    let mut skipped = 0usize;
    for (index, result) in rdr.records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                // Row numbers are 1-based and count the header.
                warn!("Skipping unreadable row {}: {}", index + 2, e);
                skipped += 1;
                continue;
            }
        };
        if is_blank(&record) {
            debug!("Skipping blank row {}", index + 2);
            continue;
        }

        let row: RawRow = headers
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), record.get(i).unwrap_or("").to_string()))
            .collect();
        records.push(T::from_row(row));
    }

    info!(
        "Parsed {} records ({} columns, {} rows skipped).",
        records.len(),
        headers.len(),
        skipped
    );

    LoadedTable { headers, records }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{FieldAccess, MetadataRecord, PrimaryRecord};

    #[test]
    fn test_parse_primary_snapshot() {
        let text = "ID,Loop,genus,S1,S2\nG1,NL,Escherichia,1.5,0\nG2,mL1,Bacteroides,0,3\n";
        let table: LoadedTable<PrimaryRecord> = load_records(text);

        assert_eq!(table.headers, vec!["ID", "Loop", "genus", "S1", "S2"]);
        assert_eq!(table.records.len(), 2);
        assert_eq!(table.records[0].id(), "G1");
        assert_eq!(table.records[1].fields.loop_class, "mL1");
        assert_eq!(table.records[1].abundance("S2"), Some("3"));
    }

    #[test]
    fn test_short_rows_default_to_empty() {
        let text = "ID,Country,Age\nS1,USA\n";
        let table: LoadedTable<MetadataRecord> = load_records(text);

        assert_eq!(table.records.len(), 1);
        assert_eq!(table.records[0].field("Country"), Some("USA"));
        assert_eq!(table.records[0].field("Age"), Some(""));
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let text = "ID,Country\nS1,USA\n\n   \nS2,China\n";
        let table: LoadedTable<MetadataRecord> = load_records(text);

        let ids: Vec<&str> = table.records.iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec!["S1", "S2"]);
    }

    #[test]
    fn test_missing_header_yields_empty_table() {
        let table: LoadedTable<PrimaryRecord> = load_records("");
        assert!(table.is_empty());
        assert!(table.headers.is_empty());

        let table: LoadedTable<PrimaryRecord> = load_records("\n\n");
        assert!(table.is_empty());
    }

    #[test]
    fn test_tab_delimited_and_bom() {
        let text = "\u{feff}ID\tStudy\nS1\tZeller\n";
        let table: LoadedTable<MetadataRecord> = parse_delimited(text, b'\t');

        assert_eq!(table.headers[0], "ID");
        assert_eq!(table.records[0].fields.study, "Zeller");
    }

    #[test]
    fn test_display_columns_put_id_first() {
        let text = "Loop,ID,S1\nNL,G1,2\n";
        let table: LoadedTable<PrimaryRecord> = load_records(text);
        assert_eq!(table.display_columns(), vec!["ID", "Loop", "S1"]);
    }
}
