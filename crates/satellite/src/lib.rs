//! Satellite raster exports.
//!
//! Each source (MODIS aerosol optical depth, ERA5-Land daily aggregates) is
//! exported per day as a GeoTIFF named `<SOURCE>_<YYYYMMDD>.tif` into the
//! service bucket. Exports run asynchronously on Earth Engine; triggering
//! returns as soon as the tasks are accepted.

pub mod expression;
pub mod exporter;
pub mod sources;

pub use exporter::{EarthEngineConfig, EarthEngineExporter, ExportTask, ExportTrigger, LoggingExporter};
pub use sources::SatelliteSource;
