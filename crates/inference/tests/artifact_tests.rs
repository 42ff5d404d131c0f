//! Loading artifacts from disk and predicting through the trait object.

use std::io::Write;

use inference::{load_model, ModelArtifact, Regressor};
use pm25_common::FeatureMatrix;
use tempfile::NamedTempFile;
use test_utils::assert_approx_eq;

const FOREST: &str = r#"{
    "type": "tree_ensemble",
    "aggregation": "mean",
    "n_features": 2,
    "trees": [
        {
            "children_left": [1, -1, -1],
            "children_right": [2, -1, -1],
            "feature": [0, -2, -2],
            "threshold": [0.5, -2.0, -2.0],
            "value": [0.0, 10.0, 20.0]
        },
        {
            "children_left": [1, -1, -1],
            "children_right": [2, -1, -1],
            "feature": [1, -2, -2],
            "threshold": [100.0, -2.0, -2.0],
            "value": [0.0, 30.0, 40.0]
        }
    ]
}"#;

const BOOSTED: &str = r#"{
    "type": "tree_ensemble",
    "aggregation": "sum",
    "learning_rate": 0.5,
    "base_score": 15.0,
    "trees": [
        {
            "children_left": [-1],
            "children_right": [-1],
            "feature": [-2],
            "threshold": [-2.0],
            "value": [4.0]
        },
        {
            "children_left": [-1],
            "children_right": [-1],
            "feature": [-2],
            "threshold": [-2.0],
            "value": [-2.0]
        }
    ]
}"#;

fn write_artifact(json: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(json.as_bytes()).unwrap();
    file
}

fn features(rows: &[Vec<f64>]) -> FeatureMatrix {
    FeatureMatrix::from_rows(vec!["Optical_Depth_047".into(), "temperature_2m".into()], rows).unwrap()
}

#[test]
fn test_load_forest_and_predict() {
    let file = write_artifact(FOREST);
    let model = load_model(file.path()).unwrap();
    assert_eq!(model.n_features(), Some(2));

    let out = model
        .predict(&features(&[vec![0.1, 50.0], vec![0.9, 50.0], vec![0.9, 300.0]]))
        .unwrap();
    assert_eq!(out, vec![20.0, 25.0, 30.0]);
}

#[test]
fn test_boosted_ensemble() {
    let model = ModelArtifact::from_json(BOOSTED).unwrap();
    let out = model.predict(&features(&[vec![0.0, 0.0]])).unwrap();
    assert_approx_eq!(out[0], 16.0, 1e-12);
}

#[test]
fn test_feature_count_mismatch() {
    let model = ModelArtifact::from_json(FOREST).unwrap();
    let three = FeatureMatrix::from_rows(
        vec!["a".into(), "b".into(), "c".into()],
        &[vec![0.0, 0.0, 0.0]],
    )
    .unwrap();
    let err = model.predict(&three).unwrap_err();
    assert_eq!(err.kind(), "model");
    assert_eq!(err.http_status_code(), 500);
}

#[test]
fn test_deterministic() {
    let model = ModelArtifact::from_json(FOREST).unwrap();
    let rows: Vec<Vec<f64>> = (0..100).map(|i| vec![i as f64 / 100.0, i as f64 * 3.0]).collect();
    let m = features(&rows);
    assert_eq!(model.predict(&m).unwrap(), model.predict(&m).unwrap());
}

#[test]
fn test_invalid_tree_rejected() {
    let broken = FOREST.replace("\"children_left\": [1, -1, -1]", "\"children_left\": [0, -1, -1]");
    let err = ModelArtifact::from_json(&broken).unwrap_err();
    assert!(err.to_string().contains("tree 0"));
}

#[test]
fn test_missing_file() {
    let err = load_model("/nonexistent/model.json").err().expect("expected load_model to fail");
    assert_eq!(err.kind(), "model");
}
