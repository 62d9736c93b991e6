use std::collections::{BTreeSet, HashMap};

use crate::domain::entities::row::{CellValue, Dataset, Row};

/// Session-local row identity, assigned at load time and never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowId(pub u64);

impl From<u64> for RowId {
    fn from(value: u64) -> Self {
        RowId(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CellKey {
    pub row: RowId,
    pub column: String,
}

#[derive(Debug, Clone, Default)]
pub struct StagedEdits {
    pub staged_cells: HashMap<CellKey, CellValue>,
    pub deleted_rows: BTreeSet<RowId>,
    pub added_rows: Vec<Row>,
}

impl StagedEdits {
    pub fn is_empty(&self) -> bool {
        self.staged_cells.is_empty() && self.deleted_rows.is_empty() && self.added_rows.is_empty()
    }

    pub fn stage_cell(&mut self, row: RowId, column: impl Into<String>, value: CellValue) {
        self.staged_cells.insert(
            CellKey {
                row,
                column: column.into(),
            },
            value,
        );
    }
}

/// Applies staged cell values and deletions in row order, then appends added rows.
pub fn build_updated_rows<'a, I>(rows: I, edits: &StagedEdits) -> Dataset
where
    I: IntoIterator<Item = (&'a RowId, &'a Row)>,
{
    let mut updated = Vec::new();
    for (row_id, row) in rows {
        if edits.deleted_rows.contains(row_id) {
            continue;
        }
        let mut next_row = row.clone();
        for (key, value) in &edits.staged_cells {
            if key.row == *row_id {
                next_row.set(key.column.clone(), value.clone());
            }
        }
        updated.push(next_row);
    }
    updated.extend(edits.added_rows.iter().cloned());
    updated
}
