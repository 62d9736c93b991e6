use std::sync::RwLock;

use crate::domain::entities::row::Dataset;
use crate::usecase::ports::repo::{RecordStore, StoreError};

/// In-process store. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RwLock<Option<Dataset>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(rows: Dataset) -> Self {
        Self {
            data: RwLock::new(Some(rows)),
        }
    }
}

impl RecordStore for MemoryStore {
    fn init(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn get(&self) -> Result<Option<Dataset>, StoreError> {
        self.data
            .read()
            .map(|guard| guard.clone())
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }

    fn set(&self, dataset: &Dataset) -> Result<(), StoreError> {
        let mut guard = self
            .data
            .write()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))?;
        *guard = Some(dataset.clone());
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
