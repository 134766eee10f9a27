//! The tabular result artifact: CSV out, CSV back in.

use std::fs;
use std::path::Path;

use crate::error::TableError;
use crate::grid::ResultGrid;
use crate::space::ResultColumns;

/// Write the finalized grid as a CSV table.
///
/// One header row (declared names, or positional `0..N-1` labels), one
/// record per grid row, no index column. The table is written to a sibling
/// temp file and renamed into place, so readers never see a half-written
/// artifact.
pub fn write_table(
    path: &Path,
    grid: &ResultGrid,
    columns: &ResultColumns,
) -> Result<(), TableError> {
    if columns.len() != grid.columns() {
        return Err(TableError::HeaderMismatch {
            expected: grid.columns(),
            found: columns.len(),
        });
    }
    let tmp = path.with_extension("tmp");
    {
        let file = fs::File::create(&tmp)?;
        let mut writer = csv::Writer::from_writer(file);
        writer.write_record(columns.labels())?;
        for row in grid.rows_iter() {
            writer.write_record(row.iter().map(|value| value.to_string()))?;
        }
        writer.flush()?;
    }
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Read a persisted table back into a flat grid.
///
/// The header width must match the declared column count and every field
/// must parse as a float. Reshaping against a parameter space is the
/// caller's next step; see [`ResultGrid::reshape`].
pub fn read_table(path: &Path, columns: &ResultColumns) -> Result<ResultGrid, TableError> {
    let mut reader = csv::Reader::from_path(path)?;
    let expected = columns.len();
    let found = reader.headers()?.len();
    if found != expected {
        return Err(TableError::HeaderMismatch { expected, found });
    }

    let mut data = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record?;
        for (column, field) in record.iter().enumerate() {
            let value = field
                .trim()
                .parse::<f64>()
                .map_err(|_| TableError::BadNumber {
                    row,
                    column,
                    token: field.to_string(),
                })?;
            data.push(value);
        }
    }
    ResultGrid::from_flat(expected, data)
        .ok_or_else(|| TableError::Csv("table rows are not rectangular".to_string()))
}
