//! PM2.5 prediction map service library.
//!
//! Exposes the router and pipeline so integration tests can drive them with
//! in-memory storage and stub collaborators.

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod pipeline;
pub mod state;

use std::sync::Arc;

use axum::{extract::Extension, routing::get, Router};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

pub use config::{AppConfig, Args, PipelineConfig};
pub use pipeline::{MapPipeline, MapResult};
pub use state::AppState;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::root_handler))
        .route(
            "/generate-map",
            get(handlers::generate_map_get).post(handlers::generate_map_post),
        )
        .route(
            "/generate-map/",
            get(handlers::generate_map_get).post(handlers::generate_map_post),
        )
        .route("/health", get(handlers::health_handler))
        .route("/metrics", get(handlers::metrics_handler))
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
}
