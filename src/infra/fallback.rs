use std::sync::Arc;

use tracing::warn;

use crate::domain::entities::row::Dataset;
use crate::infra::memory::MemoryStore;
use crate::usecase::ports::repo::{RecordStore, StoreError};

/// Primary store with an in-memory stand-in: reads and writes go to memory while the
/// primary is failing. A write absorbed by memory is reported as success and is lost
/// on restart.
pub struct FallbackStore {
    primary: Arc<dyn RecordStore>,
    fallback: MemoryStore,
}

impl FallbackStore {
    pub fn new(primary: Arc<dyn RecordStore>) -> Self {
        Self {
            primary,
            fallback: MemoryStore::new(),
        }
    }

    pub fn with_fallback_rows(primary: Arc<dyn RecordStore>, rows: Dataset) -> Self {
        Self {
            primary,
            fallback: MemoryStore::with_rows(rows),
        }
    }
}

impl RecordStore for FallbackStore {
    fn init(&self) -> Result<(), StoreError> {
        if let Err(err) = self.primary.init() {
            warn!(backend = self.primary.backend_name(), error = %err, "primary store init failed, continuing on memory");
        }
        Ok(())
    }

    fn get(&self) -> Result<Option<Dataset>, StoreError> {
        match self.primary.get() {
            Ok(data) => Ok(data),
            Err(err) => {
                warn!(backend = self.primary.backend_name(), error = %err, "primary store read failed, serving memory copy");
                self.fallback.get()
            }
        }
    }

    fn set(&self, dataset: &Dataset) -> Result<(), StoreError> {
        match self.primary.set(dataset) {
            Ok(()) => self.fallback.set(dataset),
            Err(err) => {
                warn!(backend = self.primary.backend_name(), error = %err, "primary store write failed, keeping data in memory");
                self.fallback.set(dataset)
            }
        }
    }

    fn backend_name(&self) -> &'static str {
        "fallback"
    }
}
