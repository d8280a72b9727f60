// Web server — Axum JSON API over the same cached models as the REPL.
//
// Every /api/* route takes an optional ?k= (5..=25, default from config).
// Models are fitted on first request for a k, off the async runtime, and
// cached; later requests for that k share the same Arc.

use std::sync::Arc;

use anyhow::Result;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::clustering::model::{ClusterModel, ClusterSettings, ModelCache};
use crate::config::{Config, EXPLORER_K_MAX, EXPLORER_K_MIN};
use crate::dataset::Document;
use crate::error::ClusterError;

pub mod handlers;

/// Shared application state threaded through all Axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub documents: Arc<Vec<Document>>,
    pub settings: Arc<ClusterSettings>,
    pub cache: Arc<RwLock<ModelCache>>,
    pub default_k: usize,
}

impl AppState {
    pub fn new(documents: Vec<Document>, settings: ClusterSettings, default_k: usize) -> Self {
        Self {
            documents: Arc::new(documents),
            settings: Arc::new(settings),
            cache: Arc::new(RwLock::new(ModelCache::default())),
            default_k,
        }
    }

    /// Model for `k` (or the default), fitting it on a cache miss.
    ///
    /// Errors are already shaped as JSON responses so handlers can return
    /// them directly.
    pub async fn model(&self, k: Option<usize>) -> std::result::Result<Arc<ClusterModel>, Response> {
        let k = k.unwrap_or(self.default_k);
        if Config::require_explorer_k(k).is_err() {
            return Err(api_error(
                StatusCode::BAD_REQUEST,
                &format!("k must be between {EXPLORER_K_MIN} and {EXPLORER_K_MAX}"),
            ));
        }

        if let Some(model) = self.cache.write().await.get(k) {
            return Ok(model);
        }

        // Fit outside the lock; a concurrent miss for the same k just fits twice.
        let documents = Arc::clone(&self.documents);
        let settings = Arc::clone(&self.settings);
        let fitted =
            tokio::task::spawn_blocking(move || ClusterModel::fit(&documents, &settings, k)).await;

        match fitted {
            Ok(Ok(model)) => {
                let model = Arc::new(model);
                self.cache.write().await.insert(k, Arc::clone(&model));
                Ok(model)
            }
            Ok(Err(e @ ClusterError::InvalidClusterCount { .. })) => {
                Err(api_error(StatusCode::BAD_REQUEST, &e.to_string()))
            }
            Ok(Err(e)) => {
                error!(k, error = %e, "Model fit failed");
                Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, "Clustering failed"))
            }
            Err(e) => {
                error!(k, error = %e, "Model fit task panicked");
                Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, "Clustering failed"))
            }
        }
    }
}

/// Start the Axum web server and block until it exits.
pub async fn run_server(state: AppState, port: u16, bind: &str) -> Result<()> {
    let app = build_router(state);

    let addr = format!("{bind}:{port}");
    info!("Plot explorer API listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/stats", get(handlers::stats::get_stats))
        .route("/api/categories", get(handlers::categories::list_categories))
        .route("/api/map", get(handlers::map::get_map))
        .route("/api/classify", post(handlers::classify::classify))
        .layer(
            CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::OPTIONS,
                ])
                .allow_headers([header::CONTENT_TYPE]),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness probe — always 200.
async fn health() -> impl IntoResponse {
    (
        StatusCode::OK,
        axum::Json(serde_json::json!({ "status": "ok" })),
    )
}

/// Typed JSON error response helper.
pub fn api_error(status: StatusCode, message: &str) -> Response {
    (status, axum::Json(serde_json::json!({ "error": message }))).into_response()
}
