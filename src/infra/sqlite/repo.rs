use std::path::PathBuf;

use chrono::Utc;
use tracing::debug;

use crate::domain::entities::row::Dataset;
use crate::infra::sqlite::queries::{load_blob, upsert_blob};
use crate::infra::sqlite::schema::init_db;
use crate::usecase::ports::repo::{RecordStore, StoreError};

/// A SQLite table used as a key-value store: one row per key, the dataset as JSON text.
pub struct SqliteStore {
    pub db_path: PathBuf,
    pub key: String,
}

impl SqliteStore {
    pub fn new(db_path: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Self {
            db_path: db_path.into(),
            key: key.into(),
        }
    }
}

impl RecordStore for SqliteStore {
    fn init(&self) -> Result<(), StoreError> {
        init_db(&self.db_path).map_err(|err| StoreError::Unavailable(format!("{err:#}")))
    }

    fn get(&self) -> Result<Option<Dataset>, StoreError> {
        let Some(blob) = load_blob(&self.db_path, &self.key)
            .map_err(|err| StoreError::Unavailable(format!("{err:#}")))?
        else {
            return Ok(None);
        };
        debug!(key = %self.key, updated_at = %blob.updated_at, "loaded stored dataset");
        serde_json::from_str::<Dataset>(&blob.data)
            .map(Some)
            .map_err(|err| StoreError::Corrupt(format!("key {}: {err}", self.key)))
    }

    fn set(&self, dataset: &Dataset) -> Result<(), StoreError> {
        let data = serde_json::to_string(dataset)
            .map_err(|err| StoreError::Corrupt(err.to_string()))?;
        upsert_blob(&self.db_path, &self.key, &data, &Utc::now().to_rfc3339())
            .map_err(|err| StoreError::Unavailable(format!("{err:#}")))
    }

    fn backend_name(&self) -> &'static str {
        "sqlite"
    }
}
