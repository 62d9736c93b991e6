use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use tracing::{error, info, warn};

use crate::http::dto::{HealthBody, StatusBody, ViewQuery};
use crate::http::AppState;
use crate::platform::blocking::run_blocking;
use crate::usecase::services::collection_service::CollectionError;

fn status_response(status: StatusCode, success: bool, message: impl Into<String>) -> Response {
    (
        status,
        Json(StatusBody {
            success,
            message: message.into(),
        }),
    )
        .into_response()
}

async fn blocking_call<F, T>(f: F) -> Result<T, CollectionError>
where
    F: FnOnce() -> Result<T, CollectionError> + Send + 'static,
    T: Send + 'static,
{
    run_blocking(f).await?
}

pub(crate) async fn dataset_handler(State(state): State<AppState>) -> Response {
    let collection = state.collection.clone();
    match blocking_call(move || collection.fetch_all()).await {
        Ok(rows) => Json(rows).into_response(),
        Err(err) => {
            error!(error = %err, "failed to load dataset");
            status_response(StatusCode::INTERNAL_SERVER_ERROR, false, "Failed to load data")
        }
    }
}

pub(crate) async fn replace_dataset_handler(State(state): State<AppState>, body: Bytes) -> Response {
    let body_len = body.len();
    let collection = state.collection.clone();
    match blocking_call(move || collection.replace_all_raw(&body)).await {
        Ok(rows) => {
            info!(rows, "data saved");
            status_response(StatusCode::OK, true, "Data saved")
        }
        Err(CollectionError::InvalidFormat) => {
            warn!(bytes = body_len, "rejected payload that is not an array of rows");
            status_response(StatusCode::BAD_REQUEST, false, "Invalid data format")
        }
        Err(err) => {
            error!(error = %err, "failed to save dataset");
            status_response(StatusCode::INTERNAL_SERVER_ERROR, false, "Failed to save")
        }
    }
}

pub(crate) async fn view_handler(
    State(state): State<AppState>,
    Query(query): Query<ViewQuery>,
) -> Response {
    let view_state = match query.into_state() {
        Ok(view_state) => view_state,
        Err(message) => return status_response(StatusCode::BAD_REQUEST, false, message),
    };

    let queries = state.queries.clone();
    match blocking_call(move || queries.query_page(&view_state)).await {
        Ok(page) => Json(page).into_response(),
        Err(err) => {
            error!(error = %err, "failed to build view page");
            status_response(StatusCode::INTERNAL_SERVER_ERROR, false, "Failed to load data")
        }
    }
}

pub(crate) async fn health_handler() -> impl IntoResponse {
    Json(HealthBody {
        status: "ok".to_string(),
        time: Utc::now().to_rfc3339(),
    })
}
