//! Map generation: source rasters in, rendered PM2.5 map out.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use inference::Regressor;
use pm25_common::{DateRange, Pm25Error, Pm25Result};
use raster::{
    clean_feature_table, merge_rasters, read_multiband, reshape_to_grid, scatter_values, GridShape,
    MultibandOptions,
};
use renderer::{equalize_hist, render_prediction_map, DEFAULT_BINS};
use satellite::{ExportTrigger, SatelliteSource};
use storage::{public_url, ObjectStorage, StoragePath};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::config::PipelineConfig;
use crate::metrics;

const MERGED_RASTER: &str = "output.tif";
const OUTPUT_IMAGE: &str = "output.png";

/// Outcome of a successful run.
#[derive(Debug, Clone)]
pub struct MapResult {
    pub image_url: String,
    /// Object path of the map in the bucket
    pub object_path: String,
    pub shape: GridShape,
    /// Pixels with at least one band value
    pub predicted_pixels: usize,
}

struct RenderedMap {
    png: Vec<u8>,
    shape: GridShape,
    predicted_pixels: usize,
}

pub struct MapPipeline {
    storage: ObjectStorage,
    exporter: Arc<dyn ExportTrigger>,
    model: Arc<dyn Regressor>,
    config: PipelineConfig,
    /// Runs share the working directory
    run_lock: Mutex<()>,
}

impl MapPipeline {
    pub fn new(
        storage: ObjectStorage,
        exporter: Arc<dyn ExportTrigger>,
        model: Arc<dyn Regressor>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            storage,
            exporter,
            model,
            config,
            run_lock: Mutex::new(()),
        }
    }

    pub fn storage(&self) -> &ObjectStorage {
        &self.storage
    }

    /// Produce the PM2.5 map for the start date of `range`.
    #[instrument(skip(self), fields(start = %range.start, end = %range.end))]
    pub async fn generate_map(&self, range: DateRange) -> Pm25Result<MapResult> {
        let _guard = self.run_lock.lock().await;
        let started = Instant::now();

        let date = range.compact_start();
        let objects: Vec<(SatelliteSource, String)> = SatelliteSource::ALL
            .iter()
            .map(|&source| (source, StoragePath::export_raster(source.prefix(), &date)))
            .collect();

        self.ensure_sources(&range, &objects).await?;

        let mut local = Vec::with_capacity(objects.len());
        for (_, object) in &objects {
            let path = self.config.work_dir.join(object);
            self.storage.download_to(object, &path).await?;
            local.push(path);
        }

        let merged = self.config.work_dir.join(MERGED_RASTER);
        let model = Arc::clone(&self.model);
        let scale = self.config.map_scale;
        let (primary, secondary) = (local[0].clone(), local[1].clone());

        let rendered = tokio::task::spawn_blocking(move || {
            render_map(&primary, &secondary, &merged, model.as_ref(), scale)
        })
        .await
        .map_err(|e| Pm25Error::InternalError(format!("Map task failed: {}", e)))??;

        let image_path = self.config.output_dir.join(OUTPUT_IMAGE);
        tokio::fs::create_dir_all(&self.config.output_dir).await?;
        tokio::fs::write(&image_path, &rendered.png).await?;

        let object_path = StoragePath::output_image();
        self.storage.upload_file(&image_path, &object_path).await?;
        let image_url = public_url(&self.config.public_base_url, self.storage.bucket(), &object_path);

        metrics::record_pipeline_duration(started.elapsed());
        info!(
            url = %image_url,
            height = rendered.shape.height,
            width = rendered.shape.width,
            predicted = rendered.predicted_pixels,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Map generated"
        );

        Ok(MapResult {
            image_url,
            object_path,
            shape: rendered.shape,
            predicted_pixels: rendered.predicted_pixels,
        })
    }

    /// Trigger exports for missing source rasters and wait for them within
    /// the configured bound.
    async fn ensure_sources(&self, range: &DateRange, objects: &[(SatelliteSource, String)]) -> Pm25Result<()> {
        let mut missing = Vec::new();
        for (source, object) in objects {
            if !self.storage.exists(object).await? {
                missing.push((*source, object.as_str()));
            }
        }
        if missing.is_empty() {
            return Ok(());
        }

        let mut first_err = None;
        for (source, object) in &missing {
            info!(source = %source, object = %object, "Source raster missing; triggering export");
            match self.exporter.trigger(*source, range).await {
                Ok(tasks) => metrics::record_exports(*source, tasks.len()),
                Err(e) => {
                    warn!(source = %source, error = %e, "Export trigger failed");
                    first_err.get_or_insert(e);
                }
            }
        }
        if let Some(e) = first_err {
            return Err(e);
        }

        let deadline = Instant::now() + self.config.export_wait;
        loop {
            let mut still_missing = Vec::new();
            for (source, object) in &missing {
                if !self.storage.exists(object).await? {
                    still_missing.push((*source, *object));
                }
            }
            if still_missing.is_empty() {
                return Ok(());
            }
            missing = still_missing;

            if Instant::now() >= deadline {
                let names: Vec<&str> = missing.iter().map(|(_, o)| *o).collect();
                warn!(objects = ?names, "Source rasters not yet exported");
                return Err(Pm25Error::DataNotAvailable(format!(
                    "{} not in bucket {}; export triggered, retry when it completes",
                    names.join(", "),
                    self.storage.bucket()
                )));
            }

            debug!(remaining = missing.len(), "Waiting for exports");
            tokio::time::sleep(self.config.export_poll).await;
        }
    }
}

/// Merge, tabulate, predict and render. Blocking.
fn render_map(
    primary: &Path,
    secondary: &Path,
    merged: &Path,
    model: &dyn Regressor,
    scale: usize,
) -> Pm25Result<RenderedMap> {
    let shape = merge_rasters(primary, secondary, merged, None)?;

    let mut table = read_multiband(merged, &MultibandOptions::default())?;
    let (features, retained) = clean_feature_table(&table)?;
    if retained.is_empty() {
        return Err(Pm25Error::data("no pixel in the merged raster has data"));
    }

    let predictions = model.predict(&features)?;
    if predictions.len() != retained.len() {
        return Err(Pm25Error::ModelError(format!(
            "model returned {} predictions for {} rows",
            predictions.len(),
            retained.len()
        )));
    }

    let equalized = equalize_hist(&predictions, DEFAULT_BINS);
    let prediction = scatter_values(&table, &retained, &predictions)?;
    let prediction_eq = scatter_values(&table, &retained, &equalized)?;
    table.set_column("prediction", prediction);
    table.set_column("prediction_eq", prediction_eq);

    let column = table
        .column("prediction_eq")
        .ok_or_else(|| Pm25Error::InternalError("prediction_eq column missing".to_string()))?;
    let grid = reshape_to_grid(column, shape)?.concat();
    let png = render_prediction_map(&grid, shape.width, shape.height, scale)?;

    Ok(RenderedMap {
        png,
        shape,
        predicted_pixels: retained.len(),
    })
}
