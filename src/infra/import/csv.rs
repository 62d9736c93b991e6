use std::path::Path;

use anyhow::{Context, Result};

use crate::domain::entities::row::{CellValue, Dataset, Row};
use crate::infra::import::header_names;

/// Reads a CSV with a header row. Blank cells are left out of the row and
/// rows with no values at all are skipped.
pub fn read_csv_dataset(csv_path: &Path) -> Result<Dataset> {
    let mut reader = ::csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(csv_path)
        .with_context(|| format!("failed to open csv: {}", csv_path.display()))?;
    let raw_headers = reader
        .headers()
        .with_context(|| format!("failed to read headers from csv: {}", csv_path.display()))?
        .clone();

    if raw_headers.is_empty() {
        anyhow::bail!("csv header is required")
    }
    let headers = header_names(raw_headers.iter());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.context("failed to parse csv record")?;
        let row: Row = headers
            .iter()
            .zip(record.iter())
            .filter(|(_, value)| !value.is_empty())
            .map(|(header, value)| (header.clone(), CellValue::text(value)))
            .collect();
        if !row.is_empty() {
            rows.push(row);
        }
    }

    Ok(rows)
}
