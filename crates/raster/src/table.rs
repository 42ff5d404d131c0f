//! Per-pixel feature table.

use serde::Serialize;

/// A named column of per-row values. NaN marks a missing cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureColumn {
    pub name: String,
    pub values: Vec<f64>,
}

/// Rows of `longitude`, `latitude` and one value per band.
///
/// `index` holds the pixel-identity key of each row and is strictly
/// increasing.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FeatureTable {
    pub index: Vec<usize>,
    pub longitude: Vec<f64>,
    pub latitude: Vec<f64>,
    pub columns: Vec<FeatureColumn>,
}

impl FeatureTable {
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }

    /// Add a column, replacing any existing column of the same name.
    ///
    /// # Panics
    /// If `values` does not have one entry per row.
    pub fn set_column(&mut self, name: &str, values: Vec<f64>) {
        assert_eq!(values.len(), self.len(), "column length must match row count");
        match self.columns.iter_mut().find(|c| c.name == name) {
            Some(col) => col.values = values,
            None => self.columns.push(FeatureColumn {
                name: name.to_string(),
                values,
            }),
        }
    }

    /// Row position of a pixel-identity key.
    pub fn position(&self, key: usize) -> Option<usize> {
        self.index.binary_search(&key).ok()
    }

    /// Band values of row `i`.
    pub fn row(&self, i: usize) -> Vec<f64> {
        self.columns.iter().map(|c| c.values[i]).collect()
    }

    /// Keep only rows whose `keep` flag is set.
    pub(crate) fn retain_rows(&mut self, keep: &[bool]) {
        fn filter(values: &mut Vec<f64>, keep: &[bool]) {
            let mut flags = keep.iter();
            values.retain(|_| *flags.next().unwrap_or(&false));
        }

        let mut flags = keep.iter();
        self.index.retain(|_| *flags.next().unwrap_or(&false));
        filter(&mut self.longitude, keep);
        filter(&mut self.latitude, keep);
        for col in &mut self.columns {
            filter(&mut col.values, keep);
        }
    }

    /// Drop rows with any missing band value and renumber the index from 0.
    pub fn drop_incomplete_rows(&mut self) {
        let keep: Vec<bool> = (0..self.len())
            .map(|i| self.columns.iter().all(|c| !c.values[i].is_nan()))
            .collect();
        self.retain_rows(&keep);
        self.index = (0..self.index.len()).collect();
    }
}
