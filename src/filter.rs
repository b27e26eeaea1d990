//! Predicate filtering over any record kind.
//!
//! A predicate pairs a column name with a substring. A record passes when,
//! for every predicate with a non-empty value, its column contains that
//! value case-insensitively. Records lacking the column never pass.

use crate::record::FieldAccess;
use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};

/// Column name -> substring, in the order the predicates were supplied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Predicates(IndexMap<String, String>);

impl Predicates {
    pub fn new() -> Self {
        Predicates(IndexMap::new())
    }

    /// Sets (or replaces) the predicate for `field`.
    pub fn set(&mut self, field: &str, value: &str) {
        self.0.insert(field.to_string(), value.to_string());
    }

    /// Builder form of [`Predicates::set`].
    pub fn with(mut self, field: &str, value: &str) -> Self {
        self.set(field, value);
        self
    }

    /// Clears every predicate value, keeping the field names.
    pub fn reset(&mut self) {
        self.0.values_mut().for_each(String::clear);
    }

    /// Predicates that actually constrain, with values lowercased.
    fn active(&self) -> Vec<(&str, String)> {
        self.0
            .iter()
            .filter(|(_, value)| !value.is_empty())
            .map(|(field, value)| (field.as_str(), value.to_lowercase()))
            .collect()
    }

    /// True when no predicate constrains anything.
    pub fn is_identity(&self) -> bool {
        self.0.values().all(String::is_empty)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Predicates {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Predicates(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

fn contains_ignore_case(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

fn matches_all<R: FieldAccess>(record: &R, active: &[(&str, String)]) -> bool {
    active.iter().all(|(field, needle)| match record.field(field) {
        Some(value) => contains_ignore_case(value, needle),
        None => false,
    })
}

/// Returns the records matching every active predicate, in input order.
pub fn apply_filters<R: FieldAccess + Clone>(records: &[R], predicates: &Predicates) -> Vec<R> {
    let active = predicates.active();
    if active.is_empty() {
        return records.to_vec();
    }

    let filtered: Vec<R> = records
        .iter()
        .filter(|record| matches_all(*record, &active))
        .cloned()
        .collect();
    debug!(
        "{} of {} records matched {} predicate(s).",
        filtered.len(),
        records.len(),
        active.len()
    );
    filtered
}

/// Free-text search: keeps records where any of `columns` contains `term`
/// case-insensitively. An empty term keeps everything.
pub fn search_records<R: FieldAccess + Clone, S: AsRef<str>>(
    records: &[R],
    columns: &[S],
    term: &str,
) -> Vec<R> {
    if term.is_empty() {
        return records.to_vec();
    }
    let needle = term.to_lowercase();
    records
        .iter()
        .filter(|record| {
            columns.iter().any(|column| {
                record
                    .field(column.as_ref())
                    .is_some_and(|value| contains_ignore_case(value, &needle))
            })
        })
        .cloned()
        .collect()
}

/// Identifiers of the given records, in order.
pub fn matched_ids<R: FieldAccess>(records: &[R]) -> Vec<String> {
    records.iter().map(|r| r.id().to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_records;
    use crate::record::{MetadataRecord, PrimaryRecord};

    fn metadata() -> Vec<MetadataRecord> {
        load_records(
            "ID,Country,Group,Gender,Batch\n\
             S1,USA,CRC,male,B1\n\
             S2,China,control,female,B2\n\
             S3,usa,adenoma,female,B1\n\
             S4,Germany,CRC,NA,B3\n",
        )
        .records
    }

    fn ids<R: FieldAccess>(records: &[R]) -> Vec<&str> {
        records.iter().map(|r| r.id()).collect()
    }

    #[test]
    fn test_substring_case_insensitive_conjunction() {
        let records = metadata();
        let preds = Predicates::new().with("Country", "US");
        assert_eq!(ids(&apply_filters(&records, &preds)), vec!["S1", "S3"]);

        let preds = preds.with("Gender", "FEMALE");
        assert_eq!(ids(&apply_filters(&records, &preds)), vec!["S3"]);
    }

    #[test]
    fn test_empty_predicates_are_identity() {
        let records = metadata();
        assert_eq!(apply_filters(&records, &Predicates::new()), records);

        let blank = Predicates::new().with("Country", "").with("Group", "");
        assert!(blank.is_identity());
        assert_eq!(apply_filters(&records, &blank), records);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let records = metadata();
        let preds = Predicates::new().with("Group", "c").with("Batch", "b");
        let once = apply_filters(&records, &preds);
        let twice = apply_filters(&once, &preds);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_missing_field_excludes_record() {
        let records: Vec<PrimaryRecord> = load_records(
            "ID,genus,S1\nG1,Escherichia,5\n",
        )
        .records;
        let mut other: Vec<PrimaryRecord> = load_records(
            "ID,genus,S2\nG2,Escherichia,3\nG3,Bacteroides,3\n",
        )
        .records;
        let mut all = records;
        all.append(&mut other);

        // G1 has no S2 column at all; G3 fails on genus.
        let preds = Predicates::new().with("S2", "3").with("genus", "esch");
        assert_eq!(ids(&apply_filters(&all, &preds)), vec!["G2"]);

        // A predicate on a column nobody has excludes everything.
        let preds = Predicates::new().with("Nope", "x");
        assert!(apply_filters(&all, &preds).is_empty());
    }

    #[test]
    fn test_reset_clears_values() {
        let mut preds = Predicates::new().with("Country", "USA");
        preds.reset();
        assert!(preds.is_identity());
        assert_eq!(preds.iter().count(), 1);
    }

    #[test]
    fn test_search_records_any_column() {
        let records: Vec<PrimaryRecord> = load_records(
            "ID,Loop,Length,phylum,genus\n\
             G1,NL,601,Proteobacteria,Escherichia\n\
             G2,mL1,598,Firmicutes,Roseburia\n\
             G3,NL,700,Bacteroidetes,Bacteroides\n",
        )
        .records;
        let columns = ["Loop", "Length", "phylum", "genus"];

        assert_eq!(ids(&search_records(&records, &columns, "bacte")), vec!["G1", "G3"]);
        assert_eq!(ids(&search_records(&records, &columns, "60")), vec!["G1"]);
        assert_eq!(search_records(&records, &columns, "").len(), 3);
        // ID is not a searched column.
        assert!(search_records(&records, &columns, "G2").is_empty());
    }

    #[test]
    fn test_matched_ids_preserve_order() {
        let records = metadata();
        let preds = Predicates::new().with("Group", "CRC");
        assert_eq!(matched_ids(&apply_filters(&records, &preds)), vec!["S1", "S4"]);
    }
}
