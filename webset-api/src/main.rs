//! Exa Websets API Server
//!
//! HTTP API server for Exa search, webset creation and formatted webset results.

mod error;
mod routes;

use axum::{
    http::{header, Method},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use webset_services::{Settings, WebsetService};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub webset_service: Arc<WebsetService>,
}

/// Build the full router with CORS and request tracing applied
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .nest("/api", routes::api_routes())
        .merge(routes::root_routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    if let Err(e) = dotenvy::dotenv() {
        // Not an error if the file doesn't exist
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env: {}", e);
        }
    }

    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,webset_api=debug")),
        )
        .init();

    info!("Starting Exa Websets API");

    // Refuse to start without an API key
    let settings = Settings::from_env()?;

    let client = settings.exa_client()?;
    let id_map = settings.load_id_map()?;
    info!(
        "Loaded {} enrichment ID mappings, unmatched policy: {}",
        id_map.len(),
        settings.unmatched_policy
    );

    let webset_service = WebsetService::new(Arc::new(client), id_map, settings.unmatched_policy)
        .with_poll_interval(settings.poll_interval);

    let state = AppState {
        webset_service: Arc::new(webset_service),
    };

    let app = build_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], settings.server_port));
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
