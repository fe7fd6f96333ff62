//! Webset endpoints
//!
//! NOTE: Route ordering matters in Axum. Routes with extra path segments
//! after `{webset_id}` are registered first.

use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use webset_core::{CreateWebsetRequest, FlatRecord, WebsetItem, WebsetStatus};
use webset_services::{PollOutcome, DEFAULT_WAIT_TIMEOUT};

use crate::error::error_response;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/websets/{webset_id}/wait", get(wait_for_webset))
        .route("/websets/{webset_id}/items", get(get_items))
        .route("/websets/{webset_id}/formatted", get(get_formatted))
        .route("/websets/{webset_id}", get(get_webset))
        .route("/websets", post(create_webset))
        .route("/websets/", post(create_webset))
}

#[derive(Debug, Deserialize)]
struct WaitParams {
    /// Seconds to wait
    timeout: Option<u64>,
}

#[derive(Debug, Serialize)]
struct ItemsResponse {
    items: Vec<WebsetItem>,
    total: usize,
    webset_id: String,
}

#[derive(Debug, Serialize)]
struct FormattedResponse {
    results: Vec<FlatRecord>,
    /// Number of raw items fetched, including any that failed to format
    total: usize,
    webset_id: String,
}

async fn create_webset(
    State(state): State<AppState>,
    Json(request): Json<CreateWebsetRequest>,
) -> impl IntoResponse {
    info!("Creating webset for query: {}", request.search.query);

    match state.webset_service.create_webset(&request).await {
        Ok(status) => (StatusCode::CREATED, Json(status)).into_response(),
        Err(e) => error_response("Failed to create webset", &e),
    }
}

async fn get_webset(
    State(state): State<AppState>,
    Path(webset_id): Path<String>,
) -> impl IntoResponse {
    match state.webset_service.get_status(&webset_id).await {
        Ok(status) => (StatusCode::OK, Json(status)).into_response(),
        Err(e) => error_response("Failed to get webset", &e),
    }
}

async fn wait_for_webset(
    State(state): State<AppState>,
    Path(webset_id): Path<String>,
    Query(params): Query<WaitParams>,
) -> impl IntoResponse {
    let timeout = params
        .timeout
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_WAIT_TIMEOUT);
    info!("Waiting up to {}s for webset {}", timeout.as_secs(), webset_id);

    match state.webset_service.wait(&webset_id, timeout).await {
        Ok(outcome) => {
            if let PollOutcome::TimedOut(webset) = &outcome {
                info!("Webset {} still {} after timeout", webset.id, webset.status);
            }
            let status = WebsetStatus::from(outcome.webset());
            (StatusCode::OK, Json(status)).into_response()
        }
        Err(e) => error_response("Failed waiting for webset", &e),
    }
}

async fn get_items(
    State(state): State<AppState>,
    Path(webset_id): Path<String>,
) -> impl IntoResponse {
    match state.webset_service.items(&webset_id).await {
        Ok(items) => (
            StatusCode::OK,
            Json(ItemsResponse {
                total: items.len(),
                items,
                webset_id,
            }),
        )
            .into_response(),
        Err(e) => error_response("Failed to fetch webset items", &e),
    }
}

async fn get_formatted(
    State(state): State<AppState>,
    Path(webset_id): Path<String>,
) -> impl IntoResponse {
    match state.webset_service.formatted(&webset_id, &[]).await {
        Ok(formatted) => (
            StatusCode::OK,
            Json(FormattedResponse {
                results: formatted.records,
                total: formatted.item_count,
                webset_id,
            }),
        )
            .into_response(),
        Err(e) => error_response("Failed to fetch formatted webset results", &e),
    }
}
