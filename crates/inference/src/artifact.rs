//! JSON model artifacts.
//!
//! ```json
//! { "type": "linear", "coef": [0.8, 0.1], "intercept": 3.2 }
//! { "type": "tree_ensemble", "aggregation": "mean", "trees": [ ... ] }
//! ```

use std::path::Path;
use std::sync::Arc;

use pm25_common::{FeatureMatrix, Pm25Error, Pm25Result};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::linear::LinearModel;
use crate::tree::TreeEnsemble;
use crate::Regressor;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ModelArtifact {
    Linear(LinearModel),
    TreeEnsemble(TreeEnsemble),
}

impl ModelArtifact {
    pub fn from_json(text: &str) -> Pm25Result<Self> {
        let artifact: ModelArtifact = serde_json::from_str(text)
            .map_err(|e| Pm25Error::ModelError(format!("Invalid model artifact: {}", e)))?;
        artifact.validate()?;
        Ok(artifact)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Pm25Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            Pm25Error::ModelError(format!("Cannot read model {}: {}", path.display(), e))
        })?;
        Self::from_json(&text)
    }

    fn validate(&self) -> Pm25Result<()> {
        match self {
            ModelArtifact::Linear(model) if model.coef.is_empty() => {
                Err(Pm25Error::ModelError("linear model has no coefficients".to_string()))
            }
            ModelArtifact::Linear(_) => Ok(()),
            ModelArtifact::TreeEnsemble(ensemble) => ensemble.validate(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ModelArtifact::Linear(_) => "linear",
            ModelArtifact::TreeEnsemble(_) => "tree_ensemble",
        }
    }
}

impl Regressor for ModelArtifact {
    fn predict(&self, features: &FeatureMatrix) -> Pm25Result<Vec<f64>> {
        match self {
            ModelArtifact::Linear(model) => model.predict(features),
            ModelArtifact::TreeEnsemble(ensemble) => ensemble.predict(features),
        }
    }

    fn n_features(&self) -> Option<usize> {
        match self {
            ModelArtifact::Linear(model) => model.n_features(),
            ModelArtifact::TreeEnsemble(ensemble) => ensemble.n_features(),
        }
    }
}

/// Load and validate the artifact at `path`.
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn load_model(path: impl AsRef<Path>) -> Pm25Result<Arc<dyn Regressor>> {
    let artifact = ModelArtifact::from_path(path.as_ref())?;
    info!(
        kind = artifact.kind(),
        n_features = ?artifact.n_features(),
        "Model loaded"
    );
    Ok(Arc::new(artifact))
}
