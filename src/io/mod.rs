//! Input/Output operations module.
//!
//! Handles fetching snapshots and writing browse results (filtered records,
//! projected rows, matrices, taxonomy trees).

pub mod source;

use crate::error::Result;
use crate::matrix::ProjectedMatrix;
use crate::projection::ProjectedRow;
use crate::record::{FieldAccess, ID_COLUMN};
use crate::taxonomy::TaxonomyTree;
use std::io::Write;

pub use source::{read_snapshot_text, FileSource, SnapshotKind, SnapshotSource, TextSource};

/// Writes records as CSV with the given columns.
///
/// Cells for columns a record lacks are written empty.
pub fn write_records<R: FieldAccess, S: AsRef<str>, W: Write>(
    records: &[R],
    columns: &[S],
    writer: W,
) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(columns.iter().map(|c| c.as_ref()))?;
    for record in records {
        writer.write_record(
            columns
                .iter()
                .map(|column| record.field(column.as_ref()).unwrap_or("")),
        )?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes projected rows as CSV.
///
/// The header is `ID` followed by the union of sample columns in first-seen
/// order; absent cells are written empty.
pub fn write_projected<W: Write>(rows: &[ProjectedRow], writer: W) -> Result<()> {
    let mut columns: indexmap::IndexSet<&str> = indexmap::IndexSet::new();
    columns.insert(ID_COLUMN);
    for row in rows {
        columns.extend(row.cells.keys().map(String::as_str));
    }
    let columns: Vec<&str> = columns.into_iter().collect();
    write_records(rows, &columns, writer)
}

/// Writes a matrix to CSV: a `ID` header followed by column labels, then
/// one line per row label.
pub fn write_matrix<W: Write>(matrix: &ProjectedMatrix, writer: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);

    let mut header = vec![ID_COLUMN.to_string()];
    header.extend(matrix.column_labels.iter().cloned());
    writer.write_record(&header)?;

    for (label, values) in matrix.row_labels.iter().zip(matrix.values.rows()) {
        let mut record = Vec::with_capacity(values.len() + 1);
        record.push(label.clone());
        record.extend(values.iter().map(|v| v.to_string()));
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}

/// Writes the tree as pretty-printed nested JSON.
pub fn write_tree_json<W: Write>(tree: &TaxonomyTree, mut writer: W) -> Result<()> {
    let view = tree.view(TaxonomyTree::ROOT);
    serde_json::to_writer_pretty(&mut writer, &view)?;
    writer.flush()?;
    Ok(())
}
