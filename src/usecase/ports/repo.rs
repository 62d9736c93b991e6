use thiserror::Error;

use crate::domain::entities::row::Dataset;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("stored dataset is unreadable: {0}")]
    Corrupt(String),
}

impl StoreError {
    pub fn unavailable(err: impl std::fmt::Display) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}

/// Persists one dataset under one logical key. Each `set` replaces the whole value.
pub trait RecordStore: Send + Sync {
    fn init(&self) -> Result<(), StoreError>;

    /// `None` when nothing has been stored yet.
    fn get(&self) -> Result<Option<Dataset>, StoreError>;
    fn set(&self, dataset: &Dataset) -> Result<(), StoreError>;

    fn backend_name(&self) -> &'static str;
}
