//! Integration test: prediction from partial requests

mod common;

use readmission_risk::inference::{
    DirectSynthesizer, InferenceAdapter, InferenceStrategy, PatientRequest, NEGATIVE_MESSAGE, POSITIVE_MESSAGE,
};
use readmission_risk::schema::FeatureSchema;
use readmission_risk::server::{build_state, ServerConfig};
use readmission_risk::ReadmitError;
use serde_json::json;
use std::sync::Arc;

fn adapter(strategy: InferenceStrategy) -> InferenceAdapter {
    InferenceAdapter::with_strategy(Arc::new(common::train_artifact()), strategy).unwrap()
}

fn request(value: serde_json::Value) -> PatientRequest {
    serde_json::from_value(value).unwrap()
}

fn block(schema: &FeatureSchema, values: &ndarray::Array1<f64>, prefix: &str) -> Vec<(String, f64)> {
    schema
        .columns()
        .iter()
        .enumerate()
        .filter(|(_, c)| c.starts_with(prefix))
        .map(|(i, c)| (c.clone(), values[i]))
        .collect()
}

#[test]
fn test_full_request_vector() {
    let adapter = adapter(InferenceStrategy::PipelineReplay);
    let req = request(json!({
        "Age": 45, "Gender": "Female", "Condition": "Heart Disease",
        "Treatment": "Angioplasty", "Stay_Length": 5, "Total_Cost": 15000
    }));
    let input = req.resolve().unwrap();
    let vector = adapter.vectorize(&input).unwrap();
    let schema = adapter.schema();

    assert_eq!(vector.values.len(), schema.len());
    for (column, value) in block(schema, &vector.values, "Gender_") {
        let expected = if column == "Gender_Female" { 1.0 } else { 0.0 };
        assert_eq!(value, expected, "{}", column);
    }
    for (column, value) in block(schema, &vector.values, "Condition_") {
        let expected = if column == "Condition_Heart Disease" { 1.0 } else { 0.0 };
        assert_eq!(value, expected, "{}", column);
    }

    let age = adapter.artifact().pipeline.scaler().all_params()[0];
    assert_eq!(age.field.column_name(), "Age");
    let idx = schema.index_of("Age").unwrap();
    assert!((vector.values[idx] - (45.0 - age.center) / age.scale).abs() < 1e-12);

    let prediction = adapter.predict(&req).unwrap();
    assert!(prediction.label <= 1);
    let expected = if prediction.label == 1 { POSITIVE_MESSAGE } else { NEGATIVE_MESSAGE };
    assert_eq!(prediction.message, expected);
    assert!((0.0..=1.0).contains(&prediction.probability));
    assert_eq!(prediction.defaults_applied, vec!["Satisfaction", "Insurance_Claimed"]);
}

#[test]
fn test_unknown_condition_predicts() {
    let adapter = adapter(InferenceStrategy::PipelineReplay);
    let req = request(json!({"Age": 60, "Condition": "Unknown Disease"}));
    let vector = adapter.vectorize(&req.resolve().unwrap()).unwrap();

    let conditions = block(adapter.schema(), &vector.values, "Condition_");
    assert!(!conditions.is_empty());
    assert!(conditions.iter().all(|(_, v)| *v == 0.0));
    assert!(adapter.predict(&req).is_ok());
}

#[test]
fn test_missing_stay_and_dates() {
    let adapter = adapter(InferenceStrategy::PipelineReplay);
    let req = request(json!({"Age": 30, "Gender": "Male"}));
    let input = req.resolve().unwrap();
    assert_eq!(input.resolved_stay(), None);

    let vector = adapter.vectorize(&input).unwrap();
    let idx = adapter.schema().index_of("Stay_Length").unwrap();
    assert_eq!(vector.values[idx], 0.0);
    assert!(adapter.predict(&req).is_ok());
}

#[test]
fn test_unparseable_dates_treated_as_missing() {
    let adapter = adapter(InferenceStrategy::PipelineReplay);
    let req = request(json!({"Age": 45, "Admission_Date": "someday", "Discharge_Date": "not a date"}));
    let input = req.resolve().unwrap();
    assert_eq!(input.resolved_stay(), None);

    let vector = adapter.vectorize(&input).unwrap();
    let idx = adapter.schema().index_of("Stay_Length").unwrap();
    assert_eq!(vector.values[idx], 0.0);
    assert!(adapter.predict(&req).is_ok());
}

#[test]
fn test_missing_artifact_never_serves() {
    let config = ServerConfig::default().with_model_path("/nonexistent/dir/readmission_model.json");
    assert!(matches!(build_state(config), Err(ReadmitError::StartupError(_))));
}

#[test]
fn test_empty_request_uses_documented_defaults() {
    let adapter = adapter(InferenceStrategy::PipelineReplay);
    let prediction = adapter.predict(&PatientRequest::default()).unwrap();
    assert_eq!(
        prediction.defaults_applied,
        vec!["Age", "Gender", "Condition", "Treatment", "Total_Cost", "Satisfaction", "Insurance_Claimed"]
    );
    assert!(prediction.alignment.is_exact());
}

#[test]
fn test_malformed_field_is_input_error() {
    let adapter = adapter(InferenceStrategy::PipelineReplay);
    let err = adapter.predict(&request(json!({"Age": "old"}))).unwrap_err();
    assert!(matches!(err, ReadmitError::InputError(_)));
}

#[test]
fn test_strategies_produce_identical_vectors() {
    let artifact = Arc::new(common::train_artifact());
    let replay = InferenceAdapter::new(Arc::clone(&artifact));
    let direct = InferenceAdapter::with_strategy(Arc::clone(&artifact), InferenceStrategy::DirectSynthesis).unwrap();

    let requests = [
        json!({}),
        json!({"Age": 45, "Gender": "Female", "Condition": "Heart Disease", "Treatment": "Angioplasty",
               "Stay_Length": 5, "Total_Cost": 15000}),
        json!({"Age": "17", "Gender": "Other", "Medication": "Insulin", "Satisfaction": 2,
               "Insurance_Claimed": "yes", "Admission_Date": "03-02-2025", "Discharge_Date": "10-02-2025"}),
        json!({"Age": 88.5, "Condition": "Unknown Disease", "Total_Cost": "12345.67", "Insurance_Claimed": 0}),
    ];
    for value in requests {
        let input = request(value).resolve().unwrap();
        let a = replay.vectorize(&input).unwrap();
        let b = direct.vectorize(&input).unwrap();
        assert_eq!(a.values, b.values);
    }
}

#[test]
fn test_direct_synthesis_refuses_other_schema() {
    let artifact = common::train_artifact();
    let synthesizer = DirectSynthesizer::from_artifact(&artifact).unwrap();
    assert_eq!(synthesizer.fingerprint(), artifact.schema.fingerprint());

    let mut columns = artifact.schema.columns().to_vec();
    columns.reverse();
    let other = FeatureSchema::new(columns).unwrap();

    let input = PatientRequest::default().resolve().unwrap();
    assert!(synthesizer.vectorize(&input, &other).is_err());
    assert!(synthesizer.vectorize(&input, &artifact.schema).is_ok());
}

#[test]
fn test_concurrent_predictions_share_artifact() {
    let adapter = Arc::new(adapter(InferenceStrategy::PipelineReplay));
    let baseline = adapter.predict(&request(json!({"Age": 70}))).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let adapter = Arc::clone(&adapter);
            std::thread::spawn(move || adapter.predict(&request(json!({"Age": 70}))).unwrap())
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), baseline);
    }
}
