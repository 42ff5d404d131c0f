//! Test data generators for creating synthetic raster data.
//!
//! These generators create predictable, verifiable test data patterns
//! that can be used across the test suite. All grids are `Vec<f64>` in
//! row-major order (row 0 first, then row 1, etc.).

/// Creates a test grid with predictable values.
///
/// Each cell value is calculated as: `col * 1000 + row`
///
/// This makes it easy to verify that data is being read, resampled or
/// written correctly by checking that grid[row][col] == col * 1000 + row.
///
/// # Example
///
/// ```
/// use test_utils::create_index_grid;
///
/// let grid = create_index_grid(10, 5);
/// assert_eq!(grid.len(), 50); // 10 * 5
/// assert_eq!(grid[0], 0.0);   // col=0, row=0 -> 0*1000 + 0
/// assert_eq!(grid[1], 1000.0); // col=1, row=0 -> 1*1000 + 0
/// assert_eq!(grid[10], 1.0);  // col=0, row=1 -> 0*1000 + 1
/// ```
pub fn create_index_grid(width: usize, height: usize) -> Vec<f64> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            data.push((col * 1000 + row) as f64);
        }
    }
    data
}

/// Creates a test grid with temperature-like values in Kelvin.
///
/// The values range from approximately 290K to 310K, a gradient from the
/// top-left corner to the bottom-right.
pub fn create_temperature_grid(width: usize, height: usize) -> Vec<f64> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            let x_factor = col as f64 / width.max(1) as f64;
            let y_factor = row as f64 / height.max(1) as f64;
            data.push(290.0 + x_factor * 10.0 + y_factor * 10.0);
        }
    }
    data
}

/// Creates an aerosol-optical-depth-like grid.
///
/// Values stay within 0..1000 (the scaled integer range of MODIS AOD) and
/// vary smoothly; `offset` shifts the whole field so two bands differ.
pub fn create_aod_grid(width: usize, height: usize, offset: f64) -> Vec<f64> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            let phase = (col as f64 * 0.1).sin() + (row as f64 * 0.07).cos();
            data.push((250.0 + 100.0 * phase + offset * 10.0).round());
        }
    }
    data
}

/// Creates a grid with all values set to a constant.
pub fn create_constant_grid(width: usize, height: usize, value: f64) -> Vec<f64> {
    vec![value; width * height]
}

/// Replaces every `stride`-th cell with `missing`.
///
/// Useful for exercising no-data handling with either NaN or a sentinel.
pub fn with_missing(mut data: Vec<f64>, stride: usize, missing: f64) -> Vec<f64> {
    if stride == 0 {
        return data;
    }
    for v in data.iter_mut().step_by(stride) {
        *v = missing;
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_grid() {
        let grid = create_index_grid(10, 5);
        assert_eq!(grid.len(), 50);
        assert_eq!(grid[0], 0.0);
        assert_eq!(grid[1], 1000.0);
        assert_eq!(grid[10], 1.0);
        assert_eq!(grid[49], 9004.0);
    }

    #[test]
    fn test_temperature_grid_range() {
        let grid = create_temperature_grid(20, 20);
        assert!(grid.iter().all(|t| (290.0..=310.0).contains(t)));
        assert!(grid[0] < grid[grid.len() - 1]);
    }

    #[test]
    fn test_aod_grid_range() {
        let grid = create_aod_grid(30, 30, 1.0);
        assert!(grid.iter().all(|v| (0.0..1000.0).contains(v)));
    }

    #[test]
    fn test_with_missing() {
        let grid = with_missing(create_constant_grid(3, 2, 1.0), 2, f64::NAN);
        assert!(grid[0].is_nan());
        assert_eq!(grid[1], 1.0);
        assert!(grid[2].is_nan());
        assert!(grid[4].is_nan());
        assert_eq!(grid.iter().filter(|v| v.is_nan()).count(), 3);
    }
}
