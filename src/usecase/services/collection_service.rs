use std::sync::Arc;

use serde::de::IgnoredAny;
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::domain::entities::row::{placeholder_dataset, Dataset};
use crate::usecase::ports::repo::{RecordStore, StoreError};

#[derive(Debug, Error)]
pub enum CollectionError {
    #[error("Invalid data format")]
    InvalidFormat,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// What `fetch_all` does when nothing has been stored yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeedPolicy {
    #[default]
    Empty,
    Placeholder,
}

/// Whole-dataset fetch and replace over a record store.
pub struct CollectionService {
    repo: Arc<dyn RecordStore>,
    seed: SeedPolicy,
}

impl CollectionService {
    pub fn new(repo: Arc<dyn RecordStore>, seed: SeedPolicy) -> Self {
        Self { repo, seed }
    }

    pub fn backend_name(&self) -> &'static str {
        self.repo.backend_name()
    }

    pub fn fetch_all(&self) -> Result<Dataset, CollectionError> {
        if let Some(rows) = self.repo.get()? {
            return Ok(rows);
        }
        match self.seed {
            SeedPolicy::Empty => Ok(Vec::new()),
            SeedPolicy::Placeholder => {
                let rows = placeholder_dataset();
                match self.repo.set(&rows) {
                    Ok(()) => info!(backend = self.repo.backend_name(), "seeded placeholder row"),
                    Err(err) => warn!(error = %err, "failed to persist placeholder seed"),
                }
                Ok(rows)
            }
        }
    }

    /// Stored row count, `None` when nothing is stored. Never seeds.
    pub fn stored_len(&self) -> Result<Option<usize>, CollectionError> {
        Ok(self.repo.get()?.map(|rows| rows.len()))
    }

    pub fn replace_all(&self, rows: &Dataset) -> Result<(), CollectionError> {
        self.repo.set(rows)?;
        info!(
            backend = self.repo.backend_name(),
            rows = rows.len(),
            "replaced dataset"
        );
        Ok(())
    }

    /// Validates the payload shape before anything is written. Returns the row count.
    pub fn replace_all_raw(&self, body: &[u8]) -> Result<usize, CollectionError> {
        let rows = extract_rows(body)?;
        self.replace_all(&rows)?;
        Ok(rows.len())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ReplacePayload {
    Bare(Dataset),
    Wrapped { data: Dataset },
    Other(IgnoredAny),
}

/// Accepts `{ "data": [...] }` or a bare array; anything else, including bad JSON, is
/// an invalid format. Rows are decoded straight from the body so key order survives.
pub fn extract_rows(body: &[u8]) -> Result<Dataset, CollectionError> {
    match serde_json::from_slice::<ReplacePayload>(body) {
        Ok(ReplacePayload::Bare(rows)) | Ok(ReplacePayload::Wrapped { data: rows }) => Ok(rows),
        Ok(ReplacePayload::Other(_)) | Err(_) => Err(CollectionError::InvalidFormat),
    }
}
