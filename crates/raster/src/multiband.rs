//! Multi-band reader producing one feature row per pixel.

use std::path::Path;

use pm25_common::{Pm25Error, Pm25Result};
use tracing::{debug, instrument};

use crate::band::read_band;
use crate::dataset;
use crate::table::{FeatureColumn, FeatureTable};

/// Sentinel used when the caller does not provide one.
pub const DEFAULT_NO_DATA: f64 = -9999.0;

/// Options for [`read_multiband`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MultibandOptions {
    /// Remove rows with any missing band value and renumber the index.
    pub dropna: bool,
    /// No-data sentinel passed to every band read.
    pub no_data: Option<f64>,
}

impl Default for MultibandOptions {
    fn default() -> Self {
        Self {
            dropna: false,
            no_data: Some(DEFAULT_NO_DATA),
        }
    }
}

/// Read every band of a raster into a [`FeatureTable`].
///
/// Columns are named from the band descriptions. All bands must share one
/// grid; longitude and latitude come from band 1's grid.
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn read_multiband(path: impl AsRef<Path>, options: &MultibandOptions) -> Pm25Result<FeatureTable> {
    let path = path.as_ref();

    let (shape, gt, names) = {
        let ds = dataset::open(path)?;
        (
            dataset::shape_of(&ds),
            dataset::geo_transform(&ds, path)?,
            dataset::band_descriptions(&ds, path)?,
        )
    };

    if names.is_empty() {
        return Err(Pm25Error::data(format!("{} has no bands", path.display())));
    }

    let mut columns = Vec::with_capacity(names.len());
    for (i, name) in names.into_iter().enumerate() {
        let band = read_band(path, i + 1, options.no_data, None)?;
        let mut values = vec![f64::NAN; shape.len()];
        for (&pixel, &value) in band.pixel.iter().zip(&band.value) {
            values[pixel] = value;
        }
        columns.push(FeatureColumn { name, values });
    }

    let (longitude, latitude) = gt.pixel_centers(shape);
    let mut table = FeatureTable {
        index: (0..shape.len()).collect(),
        longitude,
        latitude,
        columns,
    };

    if options.dropna {
        table.drop_incomplete_rows();
    }

    debug!(
        rows = table.len(),
        bands = table.columns.len(),
        dropna = options.dropna,
        "Built feature table"
    );
    Ok(table)
}
