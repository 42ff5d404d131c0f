//! Place per-row predictions back onto the raster grid.

use pm25_common::{Pm25Error, Pm25Result};

use crate::geotransform::GridShape;
use crate::table::FeatureTable;

/// Build a table-aligned column from values keyed by retained rows.
///
/// `values[i]` belongs to the row whose key is `retained[i]`. Rows not in
/// `retained` get NaN.
pub fn scatter_values(table: &FeatureTable, retained: &[usize], values: &[f64]) -> Pm25Result<Vec<f64>> {
    if retained.len() != values.len() {
        return Err(Pm25Error::data(format!(
            "{} values for {} retained rows",
            values.len(),
            retained.len()
        )));
    }

    let mut column = vec![f64::NAN; table.len()];
    for (&key, &value) in retained.iter().zip(values) {
        let pos = table
            .position(key)
            .ok_or_else(|| Pm25Error::data(format!("row key {} is not in the table", key)))?;
        column[pos] = value;
    }
    Ok(column)
}

/// Reshape a full-grid column into `height` rows of `width` values.
pub fn reshape_to_grid(values: &[f64], shape: GridShape) -> Pm25Result<Vec<Vec<f64>>> {
    if values.len() != shape.len() {
        return Err(Pm25Error::data(format!(
            "cannot reshape {} values into {}x{}",
            values.len(),
            shape.height,
            shape.width
        )));
    }
    if shape.width == 0 {
        return Ok(vec![Vec::new(); shape.height]);
    }
    Ok(values.chunks_exact(shape.width).map(<[f64]>::to_vec).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::FeatureColumn;

    fn table(n: usize) -> FeatureTable {
        FeatureTable {
            index: (0..n).collect(),
            longitude: vec![0.0; n],
            latitude: vec![0.0; n],
            columns: vec![FeatureColumn {
                name: "b".into(),
                values: vec![1.0; n],
            }],
        }
    }

    #[test]
    fn test_scatter_fills_gaps_with_nan() {
        let column = scatter_values(&table(4), &[0, 1, 3], &[10.0, 11.0, 13.0]).unwrap();
        assert_eq!(column[0], 10.0);
        assert_eq!(column[1], 11.0);
        assert!(column[2].is_nan());
        assert_eq!(column[3], 13.0);
    }

    #[test]
    fn test_scatter_length_mismatch() {
        let err = scatter_values(&table(4), &[0, 1], &[1.0]).unwrap_err();
        assert_eq!(err.kind(), "data");
    }

    #[test]
    fn test_scatter_unknown_key() {
        assert!(scatter_values(&table(2), &[5], &[1.0]).is_err());
    }

    #[test]
    fn test_reshape_row_major() {
        let grid = reshape_to_grid(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], GridShape::new(2, 3)).unwrap();
        assert_eq!(grid, vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]);
    }

    #[test]
    fn test_reshape_wrong_length() {
        assert!(reshape_to_grid(&[1.0, 2.0], GridShape::new(2, 2)).is_err());
    }
}
