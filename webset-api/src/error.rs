//! Error responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;
use webset_core::WebsetError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub detail: String,
}

/// Map a service error onto an HTTP response.
///
/// Invalid request bodies are 422; anything from Exa is classified by its
/// message and reported as `Exa API error: ...`.
pub fn error_response(context: &str, e: &WebsetError) -> Response {
    error!("{}: {}", context, e);

    let (status, detail) = match e {
        WebsetError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.clone()),
        other => (
            StatusCode::from_u16(other.http_class().status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            format!("Exa API error: {}", other.detail()),
        ),
    };

    (status, Json(ErrorResponse { detail })).into_response()
}
