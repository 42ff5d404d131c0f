//! Prometheus metrics.
//!
//! Recorded through the `metrics` facade; the binary installs the Prometheus
//! recorder and `/metrics` renders it.

use std::time::Duration;

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use satellite::SatelliteSource;

pub const REQUESTS_TOTAL: &str = "pm25_requests_total";
pub const PIPELINE_DURATION: &str = "pm25_pipeline_duration_seconds";
pub const EXPORTS_TRIGGERED: &str = "pm25_exports_triggered_total";

/// Register metric descriptions with the installed recorder.
pub fn describe() {
    describe_counter!(REQUESTS_TOTAL, "Map generation requests by outcome");
    describe_histogram!(
        PIPELINE_DURATION,
        Unit::Seconds,
        "Wall time of successful map generation runs"
    );
    describe_counter!(EXPORTS_TRIGGERED, "Satellite exports started, by source");
}

/// `outcome` is `success` or the error kind.
pub fn record_request(outcome: &'static str) {
    counter!(REQUESTS_TOTAL, "outcome" => outcome).increment(1);
}

pub fn record_pipeline_duration(elapsed: Duration) {
    histogram!(PIPELINE_DURATION).record(elapsed.as_secs_f64());
}

pub fn record_exports(source: SatelliteSource, count: usize) {
    counter!(EXPORTS_TRIGGERED, "source" => source.prefix()).increment(count as u64);
}
