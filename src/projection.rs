//! Projection of the primary dataset onto a set of matched samples.
//!
//! Given the sample identifiers surfaced by a metadata filter, each primary
//! record is cut down to its identifier plus the abundance cells for those
//! samples. Rows that end up with no cells, or only zero-valued cells, are
//! dropped.

use crate::record::{FieldAccess, PrimaryRecord, ID_COLUMN};
use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};

/// Numeric value of an abundance cell.
///
/// Reads the longest leading number after any whitespace, so `"5%"` is 5
/// and `"1,5"` is 1. Cells with no leading number (and `NaN`) count as zero.
pub fn parse_abundance(value: &str) -> f64 {
    let text = value.trim_start();
    let prefix = &text[..numeric_prefix_len(text)];
    match prefix.parse::<f64>() {
        Ok(v) if !v.is_nan() => v,
        _ => 0.0,
    }
}

/// Byte length of the leading `[+-]digits[.digits][e[+-]digits]` or
/// `[+-]Infinity` in `text`; zero when there is none.
fn numeric_prefix_len(text: &str) -> usize {
    let bytes = text.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }
    if text[end..].starts_with("Infinity") {
        return end + "Infinity".len();
    }

    let digits = |from: usize| bytes[from..].iter().take_while(|b| b.is_ascii_digit()).count();
    let integer = digits(end);
    end += integer;
    let mut fraction = 0;
    if bytes.get(end) == Some(&b'.') {
        fraction = digits(end + 1);
        if integer > 0 || fraction > 0 {
            end += 1 + fraction;
        }
    }
    if integer == 0 && fraction == 0 {
        return 0;
    }

    if matches!(bytes.get(end), Some(b'e') | Some(b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+') | Some(b'-')) {
            exp += 1;
        }
        let exp_digits = digits(exp);
        if exp_digits > 0 {
            end = exp + exp_digits;
        }
    }
    end
}

/// A primary record reduced to the matched sample columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectedRow {
    pub id: String,
    /// Sample identifier -> raw cell value, in matched-id order.
    pub cells: IndexMap<String, String>,
}

impl ProjectedRow {
    /// Number of columns including the identifier.
    pub fn column_count(&self) -> usize {
        self.cells.len() + 1
    }

    /// True when every kept cell parses to zero.
    pub fn is_all_zero(&self) -> bool {
        self.cells.values().all(|v| parse_abundance(v) == 0.0)
    }
}

impl FieldAccess for ProjectedRow {
    fn field(&self, name: &str) -> Option<&str> {
        if name == ID_COLUMN {
            Some(&self.id)
        } else {
            self.cells.get(name).map(String::as_str)
        }
    }

    fn id(&self) -> &str {
        &self.id
    }
}

fn project_record<S: AsRef<str>>(record: &PrimaryRecord, matched_ids: &[S]) -> ProjectedRow {
    let mut cells = IndexMap::new();
    for sample in matched_ids {
        let sample = sample.as_ref();
        if let Some(value) = record.abundance(sample) {
            if !value.is_empty() {
                cells.insert(sample.to_string(), value.to_string());
            }
        }
    }
    ProjectedRow {
        id: record.id().to_string(),
        cells,
    }
}

/// Projects `records` onto the `matched_ids` sample columns.
///
/// Row order follows `records`; column order follows `matched_ids`.
pub fn project<S: AsRef<str>>(records: &[PrimaryRecord], matched_ids: &[S]) -> Vec<ProjectedRow> {
    let rows: Vec<ProjectedRow> = records
        .iter()
        .map(|record| project_record(record, matched_ids))
        .filter(|row| row.column_count() > 1)
        .filter(|row| !row.is_all_zero())
        .collect();
    debug!(
        "Projected {} of {} records onto {} sample(s).",
        rows.len(),
        records.len(),
        matched_ids.len()
    );
    rows
}
