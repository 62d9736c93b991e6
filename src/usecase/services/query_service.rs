use std::sync::Arc;

use serde::Serialize;

use crate::domain::entities::dataset::{PageSpec, SortSpec, ViewState, DEFAULT_EXCLUDED_COLUMNS};
use crate::domain::entities::row::{Dataset, Row};
use crate::domain::view::{apply_view, compute_columns};
use crate::usecase::services::collection_service::{CollectionError, CollectionService};

/// One materialized page of the stored dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageResult {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
    pub match_count: usize,
    pub page_count: usize,
    pub page: usize,
    pub page_size: usize,
}

pub struct QueryService {
    collection: Arc<CollectionService>,
    excluded_columns: Vec<String>,
}

impl QueryService {
    pub fn new(collection: Arc<CollectionService>) -> Self {
        Self::with_excluded(
            collection,
            DEFAULT_EXCLUDED_COLUMNS.iter().map(|name| name.to_string()).collect(),
        )
    }

    pub fn with_excluded(collection: Arc<CollectionService>, excluded_columns: Vec<String>) -> Self {
        Self {
            collection,
            excluded_columns,
        }
    }

    pub fn query_page(&self, state: &ViewState) -> Result<PageResult, CollectionError> {
        let dataset = self.collection.fetch_all()?;
        Ok(page_of(&dataset, &self.excluded_columns, state))
    }
}

/// Clamps the requested page to the page count before running the pipeline.
pub fn page_of(dataset: &Dataset, excluded_columns: &[String], state: &ViewState) -> PageResult {
    let columns = compute_columns(dataset, excluded_columns);

    let unpaged = ViewState {
        sort: SortSpec::default(),
        page: PageSpec::new(usize::MAX, 1),
        ..state.clone()
    };
    let match_count = apply_view(dataset, &columns, &unpaged).match_count;
    let page = state.page.clamped(match_count);

    let view = apply_view(
        dataset,
        &columns,
        &ViewState {
            page,
            ..state.clone()
        },
    );
    let rows = view
        .positions
        .iter()
        .map(|position| dataset[*position].clone())
        .collect();

    PageResult {
        columns,
        rows,
        match_count: view.match_count,
        page_count: view.page_count,
        page: page.current,
        page_size: page.size,
    }
}
