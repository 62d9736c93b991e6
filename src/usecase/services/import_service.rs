use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Result};
use tracing::info;

use crate::domain::entities::row::Dataset;
use crate::infra::import::csv::read_csv_dataset;
use crate::infra::import::xlsx::read_xlsx_dataset;
use crate::usecase::services::collection_service::CollectionService;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    Imported { rows: usize },
    /// The store already held rows and `force` was not set.
    Skipped { existing_rows: usize },
}

pub struct ImportService {
    collection: Arc<CollectionService>,
}

impl ImportService {
    pub fn new(collection: Arc<CollectionService>) -> Self {
        Self { collection }
    }

    /// Replaces the stored dataset with the file's rows. Existing rows are kept unless
    /// `force` is set.
    pub fn seed_from_file(&self, path: &Path, force: bool) -> Result<SeedOutcome> {
        if !force {
            if let Some(existing_rows) = self.collection.stored_len()?.filter(|len| *len > 0) {
                info!(path = %path.display(), existing_rows, "store already holds rows, skipping seed");
                return Ok(SeedOutcome::Skipped { existing_rows });
            }
        }

        let rows = read_dataset_file(path)?;
        self.collection.replace_all(&rows)?;
        info!(path = %path.display(), rows = rows.len(), "seeded store from file");
        Ok(SeedOutcome::Imported { rows: rows.len() })
    }
}

pub fn read_dataset_file(path: &Path) -> Result<Dataset> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match extension.as_str() {
        "csv" => read_csv_dataset(path),
        "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => read_xlsx_dataset(path),
        _ => bail!("unsupported file type: {}", path.display()),
    }
}
