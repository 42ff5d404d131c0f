//! Affine geotransform and grid shape.

use serde::{Deserialize, Serialize};

/// GDAL-style affine transform `[a0, a1, a2, a3, a4, a5]`.
///
/// `x = a0 + col*a1 + row*a2`, `y = a3 + col*a4 + row*a5`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform(pub [f64; 6]);

impl GeoTransform {
    /// North-up transform from an upper-left corner and pixel size.
    pub fn north_up(origin_x: f64, origin_y: f64, pixel_width: f64, pixel_height: f64) -> Self {
        Self([origin_x, pixel_width, 0.0, origin_y, 0.0, -pixel_height.abs()])
    }

    /// Geographic coordinate of the centre of pixel `(col, row)`.
    #[inline]
    pub fn pixel_center(&self, col: usize, row: usize) -> (f64, f64) {
        let [a0, a1, a2, a3, a4, a5] = self.0;
        let x = col as f64 + 0.5;
        let y = row as f64 + 0.5;
        (a0 + x * a1 + y * a2, a3 + x * a4 + y * a5)
    }

    /// Pixel centres for a whole grid in row-major order.
    pub fn pixel_centers(&self, shape: GridShape) -> (Vec<f64>, Vec<f64>) {
        let mut xs = Vec::with_capacity(shape.len());
        let mut ys = Vec::with_capacity(shape.len());
        for row in 0..shape.height {
            for col in 0..shape.width {
                let (x, y) = self.pixel_center(col, row);
                xs.push(x);
                ys.push(y);
            }
        }
        (xs, ys)
    }
}

impl From<[f64; 6]> for GeoTransform {
    fn from(coeffs: [f64; 6]) -> Self {
        Self(coeffs)
    }
}

/// Raster dimensions in `(height, width)` order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridShape {
    pub height: usize,
    pub width: usize,
}

impl GridShape {
    pub fn new(height: usize, width: usize) -> Self {
        Self { height, width }
    }

    /// Total number of pixels.
    pub fn len(&self) -> usize {
        self.height * self.width
    }

    pub fn is_empty(&self) -> bool {
        self.height == 0 || self.width == 0
    }

    /// Row-major flat index of `(col, row)`.
    #[inline]
    pub fn flat_index(&self, col: usize, row: usize) -> usize {
        row * self.width + col
    }

    /// `(col, row)` of a flat index.
    #[inline]
    pub fn col_row(&self, index: usize) -> (usize, usize) {
        (index % self.width, index / self.width)
    }
}
