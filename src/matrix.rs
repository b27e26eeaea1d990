//! Dense abundance matrices for heatmap rendering.
//!
//! Rows are primary-record identifiers, columns are sample identifiers, and
//! cells hold the numeric abundance (zero when absent or unparseable). No
//! scaling is applied here.

use crate::projection::{parse_abundance, ProjectedRow};
use indexmap::IndexSet;
use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Represents a projected abundance matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectedMatrix {
    /// The value matrix (rows x columns).
    pub values: Array2<f64>,

    /// Row labels (record identifiers) and their lookup.
    pub row_labels: Vec<String>,
    row_map: HashMap<String, usize>,

    /// Column labels (sample identifiers) and their lookup.
    pub column_labels: Vec<String>,
    column_map: HashMap<String, usize>,
}

impl ProjectedMatrix {
    /// Creates a new, empty matrix.
    pub fn new() -> Self {
        ProjectedMatrix {
            values: Array2::zeros((0, 0)),
            row_labels: Vec::new(),
            row_map: HashMap::new(),
            column_labels: Vec::new(),
            column_map: HashMap::new(),
        }
    }

    /// Retrieves the values for a row label.
    ///
    /// Duplicate row labels resolve to the first occurrence.
    pub fn row(&self, label: &str) -> Option<ArrayView1<f64>> {
        self.row_map.get(label).map(|&idx| self.values.row(idx))
    }

    /// Retrieves the values for a column label.
    pub fn column(&self, label: &str) -> Option<ArrayView1<f64>> {
        self.column_map.get(label).map(|&idx| self.values.column(idx))
    }

    /// Single cell by labels.
    pub fn get(&self, row: &str, column: &str) -> Option<f64> {
        let r = *self.row_map.get(row)?;
        let c = *self.column_map.get(column)?;
        Some(self.values[[r, c]])
    }

    /// Returns the dimensions of the matrix (rows, columns).
    pub fn dimensions(&self) -> (usize, usize) {
        self.values.dim()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Smallest and largest cell, for colour-scale ranges.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        if self.values.is_empty() {
            return None;
        }
        Some(self.values.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        }))
    }
}

impl Default for ProjectedMatrix {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds a dense matrix from projected rows.
///
/// Columns are the union of every row's sample columns, in first-seen order.
pub fn to_matrix(rows: &[ProjectedRow]) -> ProjectedMatrix {
    let columns: IndexSet<&str> = rows
        .iter()
        .flat_map(|row| row.cells.keys().map(String::as_str))
        .collect();

    let mut values = Array2::zeros((rows.len(), columns.len()));
    for (r, row) in rows.iter().enumerate() {
        for (sample, value) in &row.cells {
            if let Some(c) = columns.get_index_of(sample.as_str()) {
                values[[r, c]] = parse_abundance(value);
            }
        }
    }

    let row_labels: Vec<String> = rows.iter().map(|row| row.id.clone()).collect();
    let mut row_map = HashMap::with_capacity(row_labels.len());
    for (i, label) in row_labels.iter().enumerate() {
        row_map.entry(label.clone()).or_insert(i);
    }
    let column_labels: Vec<String> = columns.iter().map(|c| c.to_string()).collect();
    let column_map = column_labels
        .iter()
        .enumerate()
        .map(|(i, label)| (label.clone(), i))
        .collect();

    ProjectedMatrix {
        values,
        row_labels,
        row_map,
        column_labels,
        column_map,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use indexmap::IndexMap;

    fn row(id: &str, cells: &[(&str, &str)]) -> ProjectedRow {
        ProjectedRow {
            id: id.to_string(),
            cells: cells
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<IndexMap<_, _>>(),
        }
    }

    #[test]
    fn test_new_matrix_is_empty() {
        let matrix = ProjectedMatrix::new();
        assert_eq!(matrix.dimensions(), (0, 0));
        assert!(matrix.row_labels.is_empty());
        assert!(matrix.value_range().is_none());
    }

    #[test]
    fn test_union_of_columns_in_first_seen_order() {
        let rows = vec![
            row("G1", &[("S1", "2"), ("S3", "0.5")]),
            row("G2", &[("S2", "7"), ("S1", "1")]),
        ];
        let matrix = to_matrix(&rows);

        assert_eq!(matrix.dimensions(), (2, 3));
        assert_eq!(matrix.row_labels, vec!["G1", "G2"]);
        assert_eq!(matrix.column_labels, vec!["S1", "S3", "S2"]);
        assert_relative_eq!(matrix.get("G1", "S3").unwrap(), 0.5);
        assert_relative_eq!(matrix.get("G1", "S2").unwrap(), 0.0);
        assert_relative_eq!(matrix.get("G2", "S2").unwrap(), 7.0);
        assert_eq!(matrix.column("S1").unwrap().to_vec(), vec![2.0, 1.0]);
        assert_eq!(matrix.row("G2").unwrap().to_vec(), vec![1.0, 0.0, 7.0]);
    }

    #[test]
    fn test_unparseable_cells_are_zero() {
        let rows = vec![row("G1", &[("S1", "high"), ("S2", "3")])];
        let matrix = to_matrix(&rows);
        assert_relative_eq!(matrix.get("G1", "S1").unwrap(), 0.0);
        assert_eq!(matrix.value_range(), Some((0.0, 3.0)));
    }

    #[test]
    fn test_empty_input() {
        let matrix = to_matrix(&[]);
        assert_eq!(matrix.dimensions(), (0, 0));
        assert!(matrix.is_empty());
    }
}
