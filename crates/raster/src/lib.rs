//! Raster handling for the PM2.5 pipeline.
//!
//! Turns GeoTIFF inputs into model-ready tables and back:
//! - [`read_band`]: one band to (longitude, latitude, value) rows
//! - [`read_multiband`]: every band into a per-pixel [`FeatureTable`]
//! - [`merge_rasters`]: stack a secondary raster onto a primary raster's grid
//! - [`clean_feature_table`]: drop empty pixels and zero-fill gaps
//! - [`scatter`]: write per-row results back onto the full pixel grid
//!
//! GeoTIFF I/O and resampling go through GDAL.

pub mod band;
pub mod clean;
pub mod dataset;
pub mod geotransform;
pub mod merge;
pub mod multiband;
pub mod scatter;
pub mod table;

pub use band::{read_band, BandTable, Rounding};
pub use clean::clean_feature_table;
pub use dataset::{describe, RasterInfo};
pub use geotransform::{GeoTransform, GridShape};
pub use merge::merge_rasters;
pub use multiband::{read_multiband, MultibandOptions, DEFAULT_NO_DATA};
pub use scatter::{reshape_to_grid, scatter_values};
pub use table::{FeatureColumn, FeatureTable};
