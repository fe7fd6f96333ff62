//! Search endpoint

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use tracing::info;
use webset_core::SearchRequest;

use crate::error::error_response;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/search", post(search))
        .route("/search/", post(search))
}

async fn search(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> impl IntoResponse {
    info!("Search request: {}", request.query);

    match state.webset_service.search(&request).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => error_response("Search failed", &e),
    }
}
