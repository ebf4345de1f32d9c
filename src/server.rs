//! HTTP Server - Serves rendered treemap pages and dataset JSON
//!
//! Endpoints:
//! - GET /                    → Page for the default dataset
//! - GET /datasets/:key       → Page for a dataset
//! - GET /api/datasets        → Dataset registry
//! - GET /api/datasets/:key   → Fetched hierarchy as JSON

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::get,
    Json, Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::config::{Config, Dataset};
use crate::hierarchy::Node;
use crate::loader::{self, DataFetchError};
use crate::page;
use crate::render::{CharWidthEstimate, Scene};
use crate::state::{Action, AppState, Effect};

/// Start the HTTP server
pub async fn serve(config: Config, port: u16) -> anyhow::Result<()> {
    tracing::info!("Initializing HTTP server on port {}", port);
    let app = router(Arc::new(config));

    let addr = format!("0.0.0.0:{}", port);
    tracing::info!("Starting server on http://localhost:{}", port);
    tracing::info!("  API: http://localhost:{}/api/datasets", port);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server bound to {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

pub fn router(config: Arc<Config>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    tracing::debug!("CORS layer configured: allow_origin=Any");

    let api = Router::new()
        .route("/datasets", get(list_datasets))
        .route("/datasets/:key", get(get_dataset));

    Router::new()
        .route("/", get(default_page))
        .route("/datasets/:key", get(dataset_page))
        .nest("/api", api)
        .layer(cors)
        .with_state(config)
}

/// GET / - Page for the default dataset
async fn default_page(State(config): State<Arc<Config>>) -> Result<Html<String>, StatusCode> {
    let key = config.default_dataset.clone();
    tracing::info!("GET / -> '{}'", key);
    page_for(&config, key).await
}

/// GET /datasets/:key - Page for one dataset
async fn dataset_page(
    State(config): State<Arc<Config>>,
    Path(key): Path<String>,
) -> Result<Html<String>, StatusCode> {
    tracing::info!("GET /datasets/{}", key);
    page_for(&config, key).await
}

async fn page_for(config: &Config, key: String) -> Result<Html<String>, StatusCode> {
    let mut state = AppState::new(config.clone());
    if state.dispatch(Action::Select(key.clone())) == Effect::None {
        tracing::warn!("Dataset '{}' not found", key);
        return Err(StatusCode::NOT_FOUND);
    }
    if state.load_selected().await != Effect::Render {
        return Err(StatusCode::BAD_GATEWAY);
    }

    let mut scene = Scene::new();
    let tiles = state.render(&mut scene, &CharWidthEstimate::default()).unwrap_or(0);
    tracing::debug!("Page for '{}' rendered with {} tiles", key, tiles);
    Ok(Html(page::render_page(&state, &scene, page::SERVED_LINK_BASE)))
}

/// GET /api/datasets - Registry
async fn list_datasets(State(config): State<Arc<Config>>) -> impl IntoResponse {
    tracing::debug!("GET /api/datasets - {} entries", config.datasets.len());
    Json::<Vec<Dataset>>(config.datasets.clone())
}

/// GET /api/datasets/:key - Hierarchy as JSON
async fn get_dataset(
    State(config): State<Arc<Config>>,
    Path(key): Path<String>,
) -> Result<Json<Node>, StatusCode> {
    tracing::info!("GET /api/datasets/{}", key);
    match loader::load(&config, &key).await {
        Ok(root) => Ok(Json(root)),
        Err(DataFetchError::UnknownDataset(_)) => {
            tracing::warn!("Dataset '{}' not found", key);
            Err(StatusCode::NOT_FOUND)
        }
        Err(e) => {
            tracing::error!("Error fetching data for '{}': {}", key, e);
            Err(StatusCode::BAD_GATEWAY)
        }
    }
}
