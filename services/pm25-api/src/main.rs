//! PM2.5 prediction map service.
//!
//! Serves `/generate-map/`: fetches MODIS and ERA5 rasters for a date,
//! predicts PM2.5 per pixel and publishes the rendered map.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use inference::load_model;
use pm25_api::{build_router, metrics, AppConfig, AppState, Args, MapPipeline};
use satellite::{EarthEngineExporter, ExportTrigger, LoggingExporter};
use storage::ObjectStorage;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .json()
        .init();

    let config = AppConfig::from_args(args)?;

    let prometheus = PrometheusBuilder::new().install_recorder()?;
    metrics::describe();

    info!(
        project = %config.project,
        bucket = %config.storage.bucket,
        service_account = %config.service_account,
        "Starting PM2.5 map service"
    );

    let model = load_model(&config.model_path)?;
    let storage = ObjectStorage::new(&config.storage)?;

    let exporter: Arc<dyn ExportTrigger> = match config.earth_engine.clone() {
        Some(ee) => Arc::new(EarthEngineExporter::new(ee)?),
        None => {
            warn!("EE_ACCESS_TOKEN not set; missing rasters will only be logged");
            Arc::new(LoggingExporter)
        }
    };

    let pipeline = MapPipeline::new(storage, exporter, model, config.pipeline.clone());
    let state = Arc::new(AppState::new(pipeline, prometheus));
    let app = build_router(state);

    info!(address = %config.listen_addr, "Listening");
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
