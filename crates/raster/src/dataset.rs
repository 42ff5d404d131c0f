//! Thin GDAL helpers shared by the readers and the merger.

use std::path::Path;

use gdal::{Dataset, Metadata};
use serde::Serialize;

use pm25_common::{Pm25Error, Pm25Result};

use crate::geotransform::{GeoTransform, GridShape};

/// Georeferencing and band layout of a raster file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RasterInfo {
    pub shape: GridShape,
    pub band_count: usize,
    pub descriptions: Vec<String>,
    pub geo_transform: GeoTransform,
    /// CRS as WKT; empty when the file carries none.
    pub projection: String,
    /// Declared no-data value of band 1.
    pub no_data: Option<f64>,
}

/// Open a raster for reading.
pub(crate) fn open(path: &Path) -> Pm25Result<Dataset> {
    Dataset::open(path)
        .map_err(|e| Pm25Error::data_read(format!("{}: {}", path.display(), e)))
}

pub(crate) fn shape_of(dataset: &Dataset) -> GridShape {
    let (width, height) = dataset.raster_size();
    GridShape::new(height, width)
}

pub(crate) fn band_count(dataset: &Dataset) -> usize {
    dataset.raster_count().max(0) as usize
}

pub(crate) fn geo_transform(dataset: &Dataset, path: &Path) -> Pm25Result<GeoTransform> {
    dataset
        .geo_transform()
        .map(GeoTransform)
        .map_err(|e| Pm25Error::data(format!("{} has no geotransform: {}", path.display(), e)))
}

/// Per-band descriptions, in band order. Missing descriptions become `band_<n>`.
pub(crate) fn band_descriptions(dataset: &Dataset, path: &Path) -> Pm25Result<Vec<String>> {
    (1..=band_count(dataset))
        .map(|n| {
            let band = dataset
                .rasterband(n)
                .map_err(|e| Pm25Error::data(format!("{} band {}: {}", path.display(), n, e)))?;
            let description = band.description().unwrap_or_default();
            Ok(if description.trim().is_empty() {
                format!("band_{}", n)
            } else {
                description
            })
        })
        .collect()
}

/// Summarize a raster file without reading pixel data.
pub fn describe(path: impl AsRef<Path>) -> Pm25Result<RasterInfo> {
    let path = path.as_ref();
    let dataset = open(path)?;
    let band_count = band_count(&dataset);

    let no_data = if band_count > 0 {
        dataset
            .rasterband(1)
            .map_err(|e| Pm25Error::data(format!("{}: {}", path.display(), e)))?
            .no_data_value()
    } else {
        None
    };

    Ok(RasterInfo {
        shape: shape_of(&dataset),
        band_count,
        descriptions: band_descriptions(&dataset, path)?,
        geo_transform: geo_transform(&dataset, path)?,
        projection: dataset.projection(),
        no_data,
    })
}
