//! Shared application state.

use metrics_exporter_prometheus::PrometheusHandle;

use crate::pipeline::MapPipeline;

pub struct AppState {
    pub pipeline: MapPipeline,
    /// Renders the Prometheus text exposition for `/metrics`
    pub prometheus: PrometheusHandle,
}

impl AppState {
    pub fn new(pipeline: MapPipeline, prometheus: PrometheusHandle) -> Self {
        Self {
            pipeline,
            prometheus,
        }
    }
}
