//! Single-band reader producing (longitude, latitude, value) rows.

use std::path::Path;

use pm25_common::{Pm25Error, Pm25Result};
use tracing::debug;

use crate::dataset;
use crate::geotransform::{GeoTransform, GridShape};

/// Decimal places for each output column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rounding {
    pub longitude: u32,
    pub latitude: u32,
    pub value: u32,
}

/// Valid pixels of one band, in row-major pixel order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BandTable {
    /// Flat pixel index (`row * width + col`) of each row.
    pub pixel: Vec<usize>,
    pub longitude: Vec<f64>,
    pub latitude: Vec<f64>,
    pub value: Vec<f64>,
}

impl BandTable {
    pub fn len(&self) -> usize {
        self.pixel.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixel.is_empty()
    }
}

/// Read band `band_index` (1-based) of a raster as a table of valid pixels.
///
/// A pixel is skipped when it is NaN or equals `no_data`. A zero or absent
/// sentinel means only NaN marks missing data.
pub fn read_band(
    path: impl AsRef<Path>,
    band_index: usize,
    no_data: Option<f64>,
    rounding: Option<Rounding>,
) -> Pm25Result<BandTable> {
    let path = path.as_ref();
    let ds = dataset::open(path)?;
    let count = dataset::band_count(&ds);
    if band_index == 0 || band_index > count {
        return Err(Pm25Error::BandIndexOutOfRange {
            index: band_index,
            count,
        });
    }

    let shape = dataset::shape_of(&ds);
    let gt = dataset::geo_transform(&ds, path)?;
    let values = ds
        .rasterband(band_index)
        .and_then(|band| {
            band.read_as::<f64>((0, 0), (shape.width, shape.height), (shape.width, shape.height), None)
        })
        .map_err(|e| {
            Pm25Error::data_read(format!("{} band {}: {}", path.display(), band_index, e))
        })?
        .into_shape_and_vec()
        .1;
    drop(ds);

    let table = band_table(&values, shape, &gt, no_data, rounding);
    debug!(
        path = %path.display(),
        band = band_index,
        valid = table.len(),
        total = shape.len(),
        "Read band"
    );
    Ok(table)
}

/// Build a [`BandTable`] from row-major pixel values.
pub fn band_table(
    values: &[f64],
    shape: GridShape,
    gt: &GeoTransform,
    no_data: Option<f64>,
    rounding: Option<Rounding>,
) -> BandTable {
    let sentinel = no_data.filter(|v| *v != 0.0 && !v.is_nan());
    let mut table = BandTable::default();

    for (pixel, &value) in values.iter().enumerate().take(shape.len()) {
        if is_missing(value, sentinel) {
            continue;
        }
        let (col, row) = shape.col_row(pixel);
        let (x, y) = gt.pixel_center(col, row);
        table.pixel.push(pixel);
        table.longitude.push(x);
        table.latitude.push(y);
        table.value.push(value);
    }

    if let Some(r) = rounding {
        round_in_place(&mut table.longitude, r.longitude);
        round_in_place(&mut table.latitude, r.latitude);
        round_in_place(&mut table.value, r.value);
    }

    table
}

#[inline]
pub(crate) fn is_missing(value: f64, sentinel: Option<f64>) -> bool {
    value.is_nan() || sentinel.is_some_and(|s| value == s)
}

fn round_in_place(values: &mut [f64], digits: u32) {
    let factor = 10f64.powi(digits as i32);
    for v in values.iter_mut() {
        *v = (*v * factor).round() / factor;
    }
}
