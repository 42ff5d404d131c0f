//! Decision-tree ensembles in scikit-learn's array layout.
//!
//! Each tree stores parallel per-node arrays. Node `i` is a leaf when
//! `children_left[i] == -1`; otherwise rows with
//! `x[feature[i]] <= threshold[i]` descend left. Random forests average
//! their trees, gradient boosting sums them scaled by the learning rate.

use pm25_common::{FeatureMatrix, Pm25Error, Pm25Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{check_width, Regressor};

const TREE_LEAF: i64 = -1;

/// Below this many rows prediction stays on the calling thread.
const PARALLEL_ROWS: usize = 4096;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    /// Leaf output of each node (single-output regression)
    pub value: Vec<f64>,
}

impl Tree {
    pub fn n_nodes(&self) -> usize {
        self.children_left.len()
    }

    /// Check array lengths and that every split points forward to a valid
    /// node, which guarantees traversal terminates.
    pub fn validate(&self, n_features: Option<usize>) -> Result<(), String> {
        let n = self.n_nodes();
        if n == 0 {
            return Err("tree has no nodes".to_string());
        }
        for (name, len) in [
            ("children_right", self.children_right.len()),
            ("feature", self.feature.len()),
            ("threshold", self.threshold.len()),
            ("value", self.value.len()),
        ] {
            if len != n {
                return Err(format!("{} has {} entries, expected {}", name, len, n));
            }
        }

        for i in 0..n {
            let (left, right) = (self.children_left[i], self.children_right[i]);
            if left == TREE_LEAF {
                continue;
            }
            for child in [left, right] {
                if child <= i as i64 || child as usize >= n {
                    return Err(format!("node {} has invalid child {}", i, child));
                }
            }
            let feature = self.feature[i];
            if feature < 0 || n_features.is_some_and(|nf| feature as usize >= nf) {
                return Err(format!("node {} splits on invalid feature {}", i, feature));
            }
        }
        Ok(())
    }

    /// Leaf value reached by one row. Assumes [`Tree::validate`] passed.
    pub fn predict_row(&self, row: &[f64]) -> f64 {
        let mut node = 0usize;
        while self.children_left[node] != TREE_LEAF {
            let x = row.get(self.feature[node] as usize).copied().unwrap_or(f64::NAN);
            // NaN goes right, matching `x <= threshold` being false
            node = if x <= self.threshold[node] {
                self.children_left[node] as usize
            } else {
                self.children_right[node] as usize
            };
        }
        self.value[node]
    }
}

/// How tree outputs are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    /// Random forest / extra trees
    #[default]
    Mean,
    /// Gradient boosting
    Sum,
}

fn one() -> f64 {
    1.0
}

/// `base_score + learning_rate * aggregate(trees)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeEnsemble {
    pub trees: Vec<Tree>,
    #[serde(default)]
    pub aggregation: Aggregation,
    #[serde(default = "one")]
    pub learning_rate: f64,
    #[serde(default)]
    pub base_score: f64,
    #[serde(default)]
    pub n_features: Option<usize>,
}

impl TreeEnsemble {
    pub fn validate(&self) -> Pm25Result<()> {
        if self.trees.is_empty() {
            return Err(Pm25Error::ModelError("ensemble has no trees".to_string()));
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(self.n_features)
                .map_err(|e| Pm25Error::ModelError(format!("tree {}: {}", i, e)))?;
        }
        Ok(())
    }

    fn predict_row(&self, row: &[f64]) -> f64 {
        let total: f64 = self.trees.iter().map(|t| t.predict_row(row)).sum();
        let combined = match self.aggregation {
            Aggregation::Mean => total / self.trees.len() as f64,
            Aggregation::Sum => total,
        };
        self.base_score + self.learning_rate * combined
    }
}

impl Regressor for TreeEnsemble {
    fn predict(&self, features: &FeatureMatrix) -> Pm25Result<Vec<f64>> {
        check_width(self.n_features, features)?;
        let n = features.n_rows();
        let data = features.as_slice();
        let width = features.n_cols();
        let row = |i: usize| &data[i * width..(i + 1) * width];

        let out = if n >= PARALLEL_ROWS {
            (0..n).into_par_iter().map(|i| self.predict_row(row(i))).collect()
        } else {
            (0..n).map(|i| self.predict_row(row(i))).collect()
        };
        Ok(out)
    }

    fn n_features(&self) -> Option<usize> {
        self.n_features
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// x0 <= 1.0 ? 10 : (x1 <= 5.0 ? 20 : 30)
    fn stump() -> Tree {
        Tree {
            children_left: vec![1, -1, 3, -1, -1],
            children_right: vec![2, -1, 4, -1, -1],
            feature: vec![0, -2, 1, -2, -2],
            threshold: vec![1.0, -2.0, 5.0, -2.0, -2.0],
            value: vec![0.0, 10.0, 0.0, 20.0, 30.0],
        }
    }

    fn leaf(v: f64) -> Tree {
        Tree {
            children_left: vec![-1],
            children_right: vec![-1],
            feature: vec![-2],
            threshold: vec![-2.0],
            value: vec![v],
        }
    }

    #[test]
    fn test_tree_traversal() {
        let tree = stump();
        assert!(tree.validate(Some(2)).is_ok());
        assert_eq!(tree.predict_row(&[0.5, 100.0]), 10.0);
        assert_eq!(tree.predict_row(&[1.0, 0.0]), 10.0);
        assert_eq!(tree.predict_row(&[2.0, 5.0]), 20.0);
        assert_eq!(tree.predict_row(&[2.0, 6.0]), 30.0);
        assert_eq!(tree.predict_row(&[f64::NAN, 0.0]), 20.0);
    }

    #[test]
    fn test_validate_rejects_backward_child() {
        let mut tree = stump();
        tree.children_left[2] = 0;
        assert!(tree.validate(None).is_err());
    }

    #[test]
    fn test_validate_rejects_feature_out_of_range() {
        assert!(stump().validate(Some(1)).is_err());
    }

    #[test]
    fn test_mean_and_sum_aggregation() {
        let rows = FeatureMatrix::from_rows(vec!["a".into(), "b".into()], &[vec![0.0, 0.0]]).unwrap();

        let forest = TreeEnsemble {
            trees: vec![leaf(2.0), leaf(4.0)],
            aggregation: Aggregation::Mean,
            learning_rate: 1.0,
            base_score: 0.0,
            n_features: Some(2),
        };
        assert_eq!(forest.predict(&rows).unwrap(), vec![3.0]);

        let boosted = TreeEnsemble {
            aggregation: Aggregation::Sum,
            learning_rate: 0.1,
            base_score: 12.0,
            ..forest
        };
        assert!((boosted.predict(&rows).unwrap()[0] - 12.6).abs() < 1e-12);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let ensemble = TreeEnsemble {
            trees: vec![stump(), stump()],
            aggregation: Aggregation::Mean,
            learning_rate: 1.0,
            base_score: 0.0,
            n_features: None,
        };
        let rows: Vec<Vec<f64>> = (0..PARALLEL_ROWS + 10)
            .map(|i| vec![(i % 3) as f64, (i % 11) as f64])
            .collect();
        let matrix = FeatureMatrix::from_rows(vec!["a".into(), "b".into()], &rows).unwrap();
        let out = ensemble.predict(&matrix).unwrap();
        for (row, y) in rows.iter().zip(&out) {
            assert_eq!(*y, stump().predict_row(row));
        }
    }
}
