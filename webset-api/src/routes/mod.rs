//! API route definitions

mod health;
mod search;
mod websets;

use axum::Router;

use crate::AppState;

/// Routes mounted under `/api`
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(search::routes())
        .merge(websets::routes())
}

/// Root and health routes
pub fn root_routes() -> Router<AppState> {
    health::routes()
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        Router,
    };
    use tower::ServiceExt;
    use webset_exa::testing::FakeWebsetApi;
    use webset_services::{EnrichmentIdMap, UnmatchedPolicy, WebsetService};

    use crate::{build_router, AppState};

    pub fn app(api: FakeWebsetApi) -> Router {
        let service = WebsetService::new(
            Arc::new(api),
            EnrichmentIdMap::new(),
            UnmatchedPolicy::Drop,
        );
        build_router(AppState {
            webset_service: Arc::new(service),
        })
    }

    pub async fn send(
        app: Router,
        method: &str,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => request
                .header("content-type", "application/json")
                .body(Body::from(json.to_string())),
            None => request.body(Body::empty()),
        }
        .unwrap();

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }
}
