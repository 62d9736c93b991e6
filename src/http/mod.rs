pub mod dto;
mod handlers;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::Router;

use crate::config::DEFAULT_MAX_BODY_BYTES;
use crate::usecase::services::collection_service::CollectionService;
use crate::usecase::services::query_service::QueryService;

#[derive(Clone)]
pub struct AppState {
    pub collection: Arc<CollectionService>,
    pub queries: Arc<QueryService>,
}

impl AppState {
    pub fn new(collection: Arc<CollectionService>) -> Self {
        Self {
            queries: Arc::new(QueryService::new(collection.clone())),
            collection,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterOptions {
    /// Path segment after `/api/`.
    pub resource: String,
    pub max_body_bytes: usize,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            resource: crate::config::DEFAULT_RESOURCE.to_string(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

pub fn build_router(state: AppState, options: &RouterOptions) -> Router {
    let resource_path = format!("/api/{}", options.resource);
    Router::new()
        .route("/api/health", get(handlers::health_handler))
        .route(
            &resource_path,
            get(handlers::dataset_handler).put(handlers::replace_dataset_handler),
        )
        .route(&format!("{resource_path}/view"), get(handlers::view_handler))
        .layer(DefaultBodyLimit::max(options.max_body_bytes))
        .with_state(state)
}
