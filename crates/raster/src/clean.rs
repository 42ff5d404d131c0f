//! Turn a feature table into a dense model input.

use pm25_common::{FeatureMatrix, Pm25Error, Pm25Result};

use crate::table::FeatureTable;

/// Build the model input from a feature table.
///
/// Band columns are kept (longitude and latitude are not features). Rows
/// whose band values are all missing are dropped, remaining gaps are filled
/// with `0.0`. Returns the matrix and the retained pixel-identity keys, in
/// table order.
pub fn clean_feature_table(table: &FeatureTable) -> Pm25Result<(FeatureMatrix, Vec<usize>)> {
    let columns: Vec<String> = table.columns.iter().map(|c| c.name.clone()).collect();
    let mut data = Vec::with_capacity(table.len() * columns.len());
    let mut retained = Vec::new();

    for (i, &key) in table.index.iter().enumerate() {
        let row = table.row(i);
        if row.iter().all(|v| v.is_nan()) {
            continue;
        }
        data.extend(row.into_iter().map(|v| if v.is_nan() { 0.0 } else { v }));
        retained.push(key);
    }

    let matrix = FeatureMatrix::new(columns, data)
        .ok_or_else(|| Pm25Error::data("feature table has ragged columns"))?;
    Ok((matrix, retained))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::FeatureColumn;

    fn table() -> FeatureTable {
        let nan = f64::NAN;
        FeatureTable {
            index: vec![0, 1, 2, 3],
            longitude: vec![120.0, 121.0, 122.0, 123.0],
            latitude: vec![14.0, 14.0, 15.0, 15.0],
            columns: vec![
                FeatureColumn {
                    name: "Optical_Depth_047".into(),
                    values: vec![0.1, nan, nan, 0.4],
                },
                FeatureColumn {
                    name: "temperature_2m".into(),
                    values: vec![300.0, 301.0, nan, nan],
                },
            ],
        }
    }

    #[test]
    fn test_drops_all_missing_rows_and_fills_gaps() {
        let (matrix, retained) = clean_feature_table(&table()).unwrap();
        assert_eq!(retained, vec![0, 1, 3]);
        assert_eq!(matrix.columns(), &["Optical_Depth_047", "temperature_2m"]);
        assert_eq!(matrix.n_rows(), 3);
        assert_eq!(matrix.row(0), &[0.1, 300.0]);
        assert_eq!(matrix.row(1), &[0.0, 301.0]);
        assert_eq!(matrix.row(2), &[0.4, 0.0]);
        assert!(matrix.as_slice().iter().all(|v| !v.is_nan()));
    }

    #[test]
    fn test_keeps_original_keys() {
        let mut t = table();
        t.index = vec![10, 20, 30, 40];
        let (_, retained) = clean_feature_table(&t).unwrap();
        assert_eq!(retained, vec![10, 20, 40]);
    }

    #[test]
    fn test_empty_table() {
        let (matrix, retained) = clean_feature_table(&FeatureTable::default()).unwrap();
        assert!(matrix.is_empty());
        assert!(retained.is_empty());
    }
}
