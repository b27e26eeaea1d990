//! Typed records for the two dataset snapshots.
//!
//! Both record kinds are split into a fixed struct of known columns plus an
//! ordered map of every other column found in the snapshot header. For the
//! primary dataset those extra columns are the per-sample abundance scores,
//! keyed by sample identifier.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Value used by the curated exports for a missing cell.
pub const MISSING_SENTINEL: &str = "NA";

/// Name of the identifier column in both snapshots.
pub const ID_COLUMN: &str = "ID";

/// Known columns of the primary dataset, in export order.
pub const PRIMARY_COLUMNS: [&str; 17] = [
    "ID",
    "Loop",
    "Loop1",
    "Loop2",
    "Length",
    "OriginalGene",
    "TAXid",
    "Rank",
    "Name",
    "phylum",
    "class",
    "order",
    "family",
    "genus",
    "species",
    "NuclSeq",
    "ProtSeq",
];

/// Known columns of the sample metadata, in export order.
pub const METADATA_COLUMNS: [&str; 15] = [
    "ID",
    "Study",
    "Country",
    "Group",
    "Stage",
    "Disease_location",
    "Age",
    "Gender",
    "BMI",
    "Alcohol_numeric",
    "Smoker",
    "Brinkman_index",
    "tnm",
    "AJCC",
    "fobt",
];

/// Returns true for an empty cell or the missing-value sentinel.
pub fn is_missing(value: &str) -> bool {
    value.is_empty() || value == MISSING_SENTINEL
}

/// A header-keyed row as produced by the loader, before typing.
pub type RawRow = IndexMap<String, String>;

/// Field lookup by column name, shared by every record kind so that the
/// filter engine can stay type-agnostic.
pub trait FieldAccess {
    /// Value of the named column, or `None` if the record has no such column.
    fn field(&self, name: &str) -> Option<&str>;

    /// The record's unique identifier.
    fn id(&self) -> &str;
}

/// Conversion from a loaded row into a typed record.
pub trait FromRow: Sized {
    fn from_row(row: RawRow) -> Self;
}

fn take(row: &mut RawRow, column: &str) -> String {
    row.shift_remove(column).unwrap_or_default()
}

/// Known columns of one catalogued protein entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimaryFields {
    pub id: String,
    pub loop_class: String,
    pub loop1: String,
    pub loop2: String,
    pub length: String,
    pub original_gene: String,
    pub tax_id: String,
    pub rank: String,
    pub name: String,
    pub phylum: String,
    pub class: String,
    pub order: String,
    pub family: String,
    pub genus: String,
    pub species: String,
    pub nucl_seq: String,
    pub prot_seq: String,
}

/// One row of the primary dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimaryRecord {
    pub fields: PrimaryFields,
    /// Sample identifier -> abundance score, in header order.
    pub abundances: IndexMap<String, String>,
}

impl PrimaryRecord {
    /// Abundance cell for a sample, if the column exists on this record.
    pub fn abundance(&self, sample_id: &str) -> Option<&str> {
        self.abundances.get(sample_id).map(String::as_str)
    }
}

impl FromRow for PrimaryRecord {
    fn from_row(mut row: RawRow) -> Self {
        let fields = PrimaryFields {
            id: take(&mut row, "ID"),
            loop_class: take(&mut row, "Loop"),
            loop1: take(&mut row, "Loop1"),
            loop2: take(&mut row, "Loop2"),
            length: take(&mut row, "Length"),
            original_gene: take(&mut row, "OriginalGene"),
            tax_id: take(&mut row, "TAXid"),
            rank: take(&mut row, "Rank"),
            name: take(&mut row, "Name"),
            phylum: take(&mut row, "phylum"),
            class: take(&mut row, "class"),
            order: take(&mut row, "order"),
            family: take(&mut row, "family"),
            genus: take(&mut row, "genus"),
            species: take(&mut row, "species"),
            nucl_seq: take(&mut row, "NuclSeq"),
            prot_seq: take(&mut row, "ProtSeq"),
        };
        PrimaryRecord {
            fields,
            abundances: row,
        }
    }
}

impl FieldAccess for PrimaryRecord {
    fn field(&self, name: &str) -> Option<&str> {
        let f = &self.fields;
        let value = match name {
            "ID" => &f.id,
            "Loop" => &f.loop_class,
            "Loop1" => &f.loop1,
            "Loop2" => &f.loop2,
            "Length" => &f.length,
            "OriginalGene" => &f.original_gene,
            "TAXid" => &f.tax_id,
            "Rank" => &f.rank,
            "Name" => &f.name,
            "phylum" => &f.phylum,
            "class" => &f.class,
            "order" => &f.order,
            "family" => &f.family,
            "genus" => &f.genus,
            "species" => &f.species,
            "NuclSeq" => &f.nucl_seq,
            "ProtSeq" => &f.prot_seq,
            other => return self.abundance(other),
        };
        Some(value.as_str())
    }

    fn id(&self) -> &str {
        &self.fields.id
    }
}

/// Known columns of one biological sample.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataFields {
    pub id: String,
    pub study: String,
    pub country: String,
    pub group: String,
    pub stage: String,
    pub disease_location: String,
    pub age: String,
    pub gender: String,
    pub bmi: String,
    pub alcohol_numeric: String,
    pub smoker: String,
    pub brinkman_index: String,
    pub tnm: String,
    pub ajcc: String,
    pub fobt: String,
}

/// One row of the sample metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataRecord {
    pub fields: MetadataFields,
    /// Columns outside the known set, in header order.
    pub extra: IndexMap<String, String>,
}

impl FromRow for MetadataRecord {
    fn from_row(mut row: RawRow) -> Self {
        let fields = MetadataFields {
            id: take(&mut row, "ID"),
            study: take(&mut row, "Study"),
            country: take(&mut row, "Country"),
            group: take(&mut row, "Group"),
            stage: take(&mut row, "Stage"),
            disease_location: take(&mut row, "Disease_location"),
            age: take(&mut row, "Age"),
            gender: take(&mut row, "Gender"),
            bmi: take(&mut row, "BMI"),
            alcohol_numeric: take(&mut row, "Alcohol_numeric"),
            smoker: take(&mut row, "Smoker"),
            brinkman_index: take(&mut row, "Brinkman_index"),
            tnm: take(&mut row, "tnm"),
            ajcc: take(&mut row, "AJCC"),
            fobt: take(&mut row, "fobt"),
        };
        MetadataRecord { fields, extra: row }
    }
}

impl FieldAccess for MetadataRecord {
    fn field(&self, name: &str) -> Option<&str> {
        let f = &self.fields;
        let value = match name {
            "ID" => &f.id,
            "Study" => &f.study,
            "Country" => &f.country,
            "Group" => &f.group,
            "Stage" => &f.stage,
            "Disease_location" => &f.disease_location,
            "Age" => &f.age,
            "Gender" => &f.gender,
            "BMI" => &f.bmi,
            "Alcohol_numeric" => &f.alcohol_numeric,
            "Smoker" => &f.smoker,
            "Brinkman_index" => &f.brinkman_index,
            "tnm" => &f.tnm,
            "AJCC" => &f.ajcc,
            "fobt" => &f.fobt,
            other => return self.extra.get(other).map(String::as_str),
        };
        Some(value.as_str())
    }

    fn id(&self) -> &str {
        &self.fields.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(pairs: &[(&str, &str)]) -> RawRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_primary_record_splits_known_and_abundance_columns() {
        let record = PrimaryRecord::from_row(raw(&[
            ("ID", "G1"),
            ("genus", "Escherichia"),
            ("S1", "0.5"),
            ("S2", "0"),
        ]));

        assert_eq!(record.id(), "G1");
        assert_eq!(record.fields.genus, "Escherichia");
        assert_eq!(record.abundances.len(), 2);
        assert_eq!(record.abundances.keys().collect::<Vec<_>>(), vec!["S1", "S2"]);
        assert_eq!(record.field("S1"), Some("0.5"));
        assert_eq!(record.field("genus"), Some("Escherichia"));
        // Known columns absent from the row default to empty.
        assert_eq!(record.field("species"), Some(""));
        assert_eq!(record.field("S9"), None);
    }

    #[test]
    fn test_metadata_record_keeps_unknown_columns() {
        let record = MetadataRecord::from_row(raw(&[
            ("ID", "S1"),
            ("Country", "USA"),
            ("Batch", "B2"),
        ]));

        assert_eq!(record.id(), "S1");
        assert_eq!(record.field("Country"), Some("USA"));
        assert_eq!(record.field("Batch"), Some("B2"));
        assert_eq!(record.field("Unknown"), None);
    }

    #[test]
    fn test_is_missing() {
        assert!(is_missing(""));
        assert!(is_missing("NA"));
        assert!(!is_missing("na"));
        assert!(!is_missing("Firmicutes"));
    }
}
