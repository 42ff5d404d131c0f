//! Ordinary least-squares style linear model.

use pm25_common::{FeatureMatrix, Pm25Result};
use serde::{Deserialize, Serialize};

use crate::{check_width, Regressor};

/// `y = intercept + coef · x`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub coef: Vec<f64>,
    #[serde(default)]
    pub intercept: f64,
}

impl Regressor for LinearModel {
    fn predict(&self, features: &FeatureMatrix) -> Pm25Result<Vec<f64>> {
        check_width(self.n_features(), features)?;
        Ok(features
            .rows()
            .take(features.n_rows())
            .map(|row| {
                self.intercept + row.iter().zip(&self.coef).map(|(x, c)| x * c).sum::<f64>()
            })
            .collect())
    }

    fn n_features(&self) -> Option<usize> {
        Some(self.coef.len())
    }
}
