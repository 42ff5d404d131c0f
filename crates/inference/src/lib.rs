//! PM2.5 regression models.
//!
//! Models are trained offline and shipped as JSON artifacts (see
//! [`ModelArtifact`]). The service loads one at startup and calls
//! [`Regressor::predict`] on each cleaned feature matrix.

pub mod artifact;
pub mod linear;
pub mod tree;

use pm25_common::{FeatureMatrix, Pm25Error, Pm25Result};

pub use artifact::{load_model, ModelArtifact};
pub use linear::LinearModel;
pub use tree::{Aggregation, Tree, TreeEnsemble};

/// A fitted model producing one PM2.5 estimate per matrix row.
pub trait Regressor: Send + Sync {
    /// Predict every row of `features`, in row order.
    fn predict(&self, features: &FeatureMatrix) -> Pm25Result<Vec<f64>>;

    /// Number of input features the model was fitted on, if known.
    fn n_features(&self) -> Option<usize>;
}

/// Reject matrices whose width differs from the fitted feature count.
pub(crate) fn check_width(expected: Option<usize>, features: &FeatureMatrix) -> Pm25Result<()> {
    match expected {
        Some(n) if n != features.n_cols() => Err(Pm25Error::ModelError(format!(
            "model expects {} features, got {} ({})",
            n,
            features.n_cols(),
            features.columns().join(", ")
        ))),
        _ => Ok(()),
    }
}
