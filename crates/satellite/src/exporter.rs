//! Triggering raster exports.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use pm25_common::{DateRange, Pm25Error, Pm25Result, Region, PHILIPPINES};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::expression;
use crate::sources::SatelliteSource;

/// One accepted export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportTask {
    pub source: SatelliteSource,
    pub date: NaiveDate,
    /// Object name the export will produce in the bucket
    pub object: String,
    /// Long-running operation name, when the backend reports one
    pub operation: Option<String>,
}

/// Starts exports of satellite rasters into the bucket.
///
/// Implementations return once the exports are accepted, not completed.
#[async_trait]
pub trait ExportTrigger: Send + Sync {
    async fn trigger(&self, source: SatelliteSource, range: &DateRange) -> Pm25Result<Vec<ExportTask>>;
}

/// Earth Engine REST API connection settings.
#[derive(Debug, Clone)]
pub struct EarthEngineConfig {
    /// API root, e.g. `https://earthengine.googleapis.com`
    pub api_url: String,
    /// Cloud project that owns the exports
    pub project: String,
    /// Destination bucket
    pub bucket: String,
    /// OAuth2 bearer token
    pub access_token: String,
    pub request_timeout: Duration,
}

/// Exports through `projects/{project}/image:export`.
pub struct EarthEngineExporter {
    client: Client,
    config: EarthEngineConfig,
    region: Region,
}

#[derive(Debug, Deserialize)]
struct Operation {
    name: Option<String>,
}

impl EarthEngineExporter {
    pub fn new(config: EarthEngineConfig) -> Pm25Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| Pm25Error::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            config,
            region: PHILIPPINES,
        })
    }

    fn export_url(&self) -> String {
        format!(
            "{}/v1/projects/{}/image:export",
            self.config.api_url.trim_end_matches('/'),
            self.config.project
        )
    }

    /// Request body for one day's export.
    pub fn export_request(&self, source: SatelliteSource, date: NaiveDate) -> serde_json::Value {
        let name = source.export_name(date);
        json!({
            "expression": expression::daily_mean(source, &self.region, date),
            "description": name,
            "fileExportOptions": {
                "fileFormat": "GEO_TIFF",
                "gcsDestination": {
                    "bucket": self.config.bucket,
                    "filenamePrefix": name,
                },
            },
        })
    }

    async fn export_day(&self, source: SatelliteSource, date: NaiveDate) -> Pm25Result<ExportTask> {
        let response = self
            .client
            .post(self.export_url())
            .bearer_auth(&self.config.access_token)
            .json(&self.export_request(source, date))
            .send()
            .await
            .map_err(|e| Pm25Error::ExportError(format!("{} export request failed: {}", source, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Pm25Error::ExportError(format!(
                "{} export for {} rejected with {}: {}",
                source,
                date,
                status,
                body.trim()
            )));
        }

        let operation = response
            .json::<Operation>()
            .await
            .map_err(|e| Pm25Error::ExportError(format!("Invalid export response: {}", e)))?;

        Ok(ExportTask {
            source,
            date,
            object: source.object_name(date),
            operation: operation.name,
        })
    }
}

#[async_trait]
impl ExportTrigger for EarthEngineExporter {
    #[instrument(skip(self, range), fields(project = %self.config.project, start = %range.start, end = %range.end))]
    async fn trigger(&self, source: SatelliteSource, range: &DateRange) -> Pm25Result<Vec<ExportTask>> {
        let mut tasks = Vec::new();
        for date in source.export_days(range) {
            let task = self.export_day(source, date).await?;
            info!(
                source = %source,
                object = %task.object,
                operation = task.operation.as_deref().unwrap_or("-"),
                "Export started"
            );
            tasks.push(task);
        }
        Ok(tasks)
    }
}

/// Logs the exports it would start. Used when no Earth Engine token is set.
#[derive(Debug, Default, Clone)]
pub struct LoggingExporter;

#[async_trait]
impl ExportTrigger for LoggingExporter {
    async fn trigger(&self, source: SatelliteSource, range: &DateRange) -> Pm25Result<Vec<ExportTask>> {
        let tasks: Vec<ExportTask> = source
            .export_days(range)
            .into_iter()
            .map(|date| ExportTask {
                source,
                date,
                object: source.object_name(date),
                operation: None,
            })
            .collect();

        for task in &tasks {
            warn!(
                source = %source,
                object = %task.object,
                "Earth Engine export not configured; upload the raster manually"
            );
        }
        Ok(tasks)
    }
}
