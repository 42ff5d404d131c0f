//! Dense row-major feature matrix handed to the model.

use serde::{Deserialize, Serialize};

/// Row-major matrix of model features, one row per retained pixel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureMatrix {
    columns: Vec<String>,
    data: Vec<f64>,
}

impl FeatureMatrix {
    /// Build from column names and row-major data.
    ///
    /// Returns `None` when the data length is not a multiple of the column count.
    pub fn new(columns: Vec<String>, data: Vec<f64>) -> Option<Self> {
        if columns.is_empty() {
            return data.is_empty().then_some(Self { columns, data });
        }
        if data.len() % columns.len() != 0 {
            return None;
        }
        Some(Self { columns, data })
    }

    pub fn from_rows(columns: Vec<String>, rows: &[Vec<f64>]) -> Option<Self> {
        if rows.iter().any(|r| r.len() != columns.len()) {
            return None;
        }
        Self::new(columns, rows.concat())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn n_rows(&self) -> usize {
        if self.columns.is_empty() {
            0
        } else {
            self.data.len() / self.columns.len()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows() == 0
    }

    pub fn row(&self, i: usize) -> &[f64] {
        let n = self.n_cols();
        &self.data[i * n..(i + 1) * n]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.data.chunks_exact(self.n_cols().max(1))
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }
}
