use std::path::Path;

use anyhow::{Context, Result};
use calamine::{open_workbook_auto, Data, Reader};

use crate::domain::entities::row::{CellValue, Dataset, Row};
use crate::infra::import::header_names;

pub fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::String(v) => v.to_string(),
        Data::Float(v) => v.to_string(),
        Data::Int(v) => v.to_string(),
        Data::Bool(v) => v.to_string(),
        Data::DateTime(v) => v.to_string(),
        Data::DateTimeIso(v) => v.to_string(),
        Data::DurationIso(v) => v.to_string(),
        Data::Error(v) => format!("{v:?}"),
        Data::Empty => String::new(),
    }
}

/// Typed cell, or `None` for a blank one.
pub fn cell_to_value(cell: &Data) -> Option<CellValue> {
    match cell {
        Data::Empty => None,
        Data::String(v) if v.is_empty() => None,
        Data::String(v) => Some(CellValue::text(v.as_str())),
        Data::Float(v) => Some(CellValue::from(*v)),
        Data::Int(v) => Some(CellValue::from(*v)),
        Data::Bool(v) => Some(CellValue::Bool(*v)),
        other => Some(CellValue::text(cell_to_string(other))),
    }
}

/// Reads the first sheet of a workbook; its first row is the header.
pub fn read_xlsx_dataset(xlsx_path: &Path) -> Result<Dataset> {
    let mut workbook = open_workbook_auto(xlsx_path)
        .with_context(|| format!("failed to open workbook: {}", xlsx_path.display()))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .with_context(|| format!("workbook has no sheets: {}", xlsx_path.display()))?;
    let range = workbook
        .worksheet_range(&sheet_name)
        .with_context(|| format!("failed to read sheet: {sheet_name}"))?;

    let mut sheet_rows = range.rows();
    let Some(header_row) = sheet_rows.next() else {
        return Ok(Vec::new());
    };
    let headers = header_names(header_row.iter().map(cell_to_string));

    let rows = sheet_rows
        .map(|cells| {
            headers
                .iter()
                .zip(cells.iter())
                .filter_map(|(header, cell)| cell_to_value(cell).map(|value| (header.clone(), value)))
                .collect::<Row>()
        })
        .filter(|row| !row.is_empty())
        .collect();

    Ok(rows)
}
