//! Shared fixtures: a small deterministic patient history

#![allow(dead_code)]

use readmission_risk::export::ModelArtifact;
use readmission_risk::preprocessing::{FeaturePipeline, PipelineConfig, RawField, RawRecord};
use readmission_risk::training::{TrainEngine, TrainingConfig};
use readmission_risk::utils::LabeledTable;
use std::path::{Path, PathBuf};

pub const HEADER: [&str; 13] = [
    "Patient_ID",
    "Age",
    "Gender",
    "Condition",
    "Medication",
    "Length_of_Stay",
    "Admission_Date",
    "Discharge_Date",
    "Total_Cost",
    "Outcome",
    "Satisfaction",
    "Insurance_Claimed",
    "Readmission",
];

const CONDITIONS: [&str; 4] = ["Heart Disease", "Stroke", "Cancer", "Diabetes"];
const MEDICATIONS: [&str; 4] = ["Angioplasty", "Insulin", "Chemotherapy", "Physiotherapy"];

/// 40 patients plus one exact duplicate of the first row
pub fn rows() -> Vec<Vec<String>> {
    let mut rows: Vec<Vec<String>> = (0..40usize)
        .map(|i| {
            let age = 20 + (i * 7) % 70;
            let stay = 2 + (i * 3) % 12;
            let readmitted = age > 55 || stay > 9;
            vec![
                format!("P{:03}", i),
                age.to_string(),
                if i % 2 == 0 { "Male" } else { "Female" }.to_string(),
                CONDITIONS[i % 4].to_string(),
                MEDICATIONS[(i / 2) % 4].to_string(),
                if i % 2 == 1 { stay.to_string() } else { String::new() },
                "01-01-2025".to_string(),
                format!("{:02}-01-2025", 1 + stay),
                (5000 + i * 500).to_string(),
                if readmitted { "Stable" } else { "Recovered" }.to_string(),
                if i % 7 == 0 { String::new() } else { (1 + i % 5).to_string() },
                if i % 3 == 0 { "Yes" } else { "No" }.to_string(),
                if readmitted { "Yes" } else { "No" }.to_string(),
            ]
        })
        .collect();
    rows.push(rows[0].clone());
    rows
}

pub fn raw_records() -> Vec<RawRecord> {
    rows()
        .into_iter()
        .map(|row| {
            let mut record = RawRecord::new();
            for (name, value) in HEADER.iter().zip(row) {
                if let Some(field) = RawField::from_column_name(name) {
                    record.set(field, (!value.is_empty()).then_some(value));
                }
            }
            record
        })
        .collect()
}

pub fn write_raw_csv(dir: &Path) -> PathBuf {
    let path = dir.join("patients.csv");
    let mut text = HEADER.join(",");
    text.push('\n');
    for row in rows() {
        text.push_str(&row.join(","));
        text.push('\n');
    }
    std::fs::write(&path, text).unwrap();
    path
}

pub fn fitted_pipeline(config: PipelineConfig) -> (FeaturePipeline, LabeledTable) {
    let mut pipeline = FeaturePipeline::new(config);
    let table = pipeline.fit_transform(&raw_records()).unwrap();
    (pipeline, LabeledTable::try_from(table).unwrap())
}

pub fn train_artifact() -> ModelArtifact {
    let (pipeline, table) = fitted_pipeline(PipelineConfig::default());
    TrainEngine::new(TrainingConfig::default())
        .train(&table, pipeline)
        .unwrap()
}

pub fn write_artifact(dir: &Path) -> PathBuf {
    let path = dir.join("models").join("readmission_model.json");
    train_artifact().save(&path).unwrap();
    path
}
