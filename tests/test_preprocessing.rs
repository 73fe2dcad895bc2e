//! Integration test: feature engineering chain

mod common;

use ndarray::Array1;
use readmission_risk::preprocessing::{FeaturePipeline, PipelineConfig, RawField, RawRecord, ScalerType};
use readmission_risk::schema::{AlignmentMode, FeatureSchema, ProducedFeatures, SchemaAligner};
use readmission_risk::utils::{load_feature_table, load_raw_records, write_feature_table};
use readmission_risk::ReadmitError;

fn fitted() -> FeaturePipeline {
    let mut pipeline = FeaturePipeline::default();
    pipeline.fit(&common::raw_records()).unwrap();
    pipeline
}

#[test]
fn test_chain_is_deterministic() {
    let records = common::raw_records();
    let mut first = FeaturePipeline::default();
    let mut second = FeaturePipeline::default();

    let a = first.fit_transform(&records).unwrap();
    let b = second.fit_transform(&records).unwrap();
    assert_eq!(a, b);

    let schema = FeatureSchema::new(a.columns.clone()).unwrap();
    let v1 = first.vectorize(&records[5], &schema).unwrap();
    let v2 = first.vectorize(&records[5], &schema).unwrap();
    assert_eq!(v1, v2);
}

#[test]
fn test_duplicates_dropped_and_median_frozen() {
    let pipeline = fitted();
    let table = pipeline.transform(&common::raw_records()).unwrap();
    assert_eq!(table.n_rows(), 40);

    let median = pipeline.cleaner().satisfaction_median().unwrap();
    let sparse = RawRecord::new().with(RawField::Age, "30");
    let cleaned = pipeline.prepare_record(&sparse);
    assert_eq!(cleaned.satisfaction, Some(median));
}

#[test]
fn test_unseen_category_gives_zero_block() {
    let pipeline = fitted();
    let schema = FeatureSchema::new(pipeline.feature_names()).unwrap();
    let record = RawRecord::new()
        .with(RawField::Age, "45")
        .with(RawField::Gender, "Female")
        .with(RawField::Condition, "Unknown Disease");

    let vector = pipeline.vectorize(&record, &schema).unwrap();
    assert_eq!(vector.values.len(), schema.len());
    for (idx, column) in schema.columns().iter().enumerate() {
        if column.starts_with("Condition_") {
            assert_eq!(vector.values[idx], 0.0, "{} should be zero", column);
        }
    }
    assert!(!schema.columns().iter().any(|c| c == "Condition_Unknown Disease"));
}

#[test]
fn test_constant_column_scales_to_zero() {
    let records: Vec<RawRecord> = common::raw_records()
        .into_iter()
        .map(|mut r| {
            r.set(RawField::TotalCost, Some("7000".to_string()));
            r
        })
        .collect();
    let mut pipeline = FeaturePipeline::new(PipelineConfig::default().with_scaler(ScalerType::MinMax));
    let table = pipeline.fit_transform(&records).unwrap();

    let params = pipeline.scaler().all_params().iter().find(|p| p.field.column_name() == "Total_Cost").unwrap();
    assert_eq!(params.scale, 0.0);
    assert!(table.column("Total_Cost").unwrap().iter().all(|v| *v == 0.0));

    let schema = FeatureSchema::new(table.columns.clone()).unwrap();
    let expensive = RawRecord::new().with(RawField::TotalCost, "99999");
    let vector = pipeline.vectorize(&expensive, &schema).unwrap();
    let idx = schema.index_of("Total_Cost").unwrap();
    assert_eq!(vector.values[idx], 0.0);
    assert!(vector.values.iter().all(|v| v.is_finite()));
}

#[test]
fn test_alignment_of_aligned_vector_is_identity() {
    let pipeline = fitted();
    let schema = FeatureSchema::new(pipeline.feature_names()).unwrap();
    let vector = pipeline.vectorize(&common::raw_records()[3], &schema).unwrap();

    let produced = ProducedFeatures::from_aligned(&schema, &vector.values).unwrap();
    let again = SchemaAligner::new(&schema, AlignmentMode::Strict).align(&produced).unwrap();
    assert_eq!(again.values, vector.values);
}

#[test]
fn test_strict_alignment_rejects_foreign_schema() {
    let pipeline = fitted();
    let schema = FeatureSchema::new(vec!["Age".to_string(), "Ward_B".to_string()]).unwrap();
    let result = pipeline.vectorize(&common::raw_records()[0], &schema);
    assert!(matches!(result, Err(ReadmitError::SchemaMismatch { .. })));
}

#[test]
fn test_age_group_encoded_from_age() {
    let pipeline = fitted();
    let schema = FeatureSchema::new(pipeline.feature_names()).unwrap();
    let senior = RawRecord::new().with(RawField::Age, "75");
    let vector = pipeline.vectorize(&senior, &schema).unwrap();

    let idx = schema.index_of("Age_Group_Senior").unwrap();
    assert_eq!(vector.values[idx], 1.0);
    let active: f64 = schema
        .columns()
        .iter()
        .enumerate()
        .filter(|(_, c)| c.starts_with("Age_Group_"))
        .map(|(i, _)| vector.values[i])
        .sum();
    assert_eq!(active, 1.0);
}

#[test]
fn test_csv_feature_table_matches_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let raw_path = common::write_raw_csv(dir.path());

    let records = load_raw_records(&raw_path).unwrap();
    assert_eq!(records.len(), 41);

    let mut pipeline = FeaturePipeline::default();
    let table = pipeline.fit_transform(&records).unwrap();
    let features_path = dir.path().join("features.csv");
    write_feature_table(&table, &features_path).unwrap();

    let loaded = load_feature_table(&features_path, &["Readmission".to_string()]).unwrap();
    assert_eq!(loaded.columns, pipeline.feature_names());
    assert_eq!(loaded.n_rows(), table.n_rows());
    for (i, row) in table.rows.iter().enumerate() {
        let read = loaded.features.row(i).to_owned();
        let expected = Array1::from(row.clone());
        assert!((&read - &expected).iter().all(|d| d.abs() < 1e-9));
    }
}
