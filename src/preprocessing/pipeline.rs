//! Feature pipeline: Cleaner → Enricher → {Encoder, Scaler}
//!
//! The same fitted pipeline builds the training feature table and, loaded
//! back from the model artifact, replays each serving request.

use super::{
    cleaner::RecordCleaner,
    config::PipelineConfig,
    demographics::DemographicsEnricher,
    encoder::CategoricalEncoder,
    record::{CleanedRecord, RawRecord},
    scaler::NumericScaler,
};
use crate::error::{ReadmitError, Result};
use crate::schema::{AlignedVector, FeatureSchema, ProducedFeatures, SchemaAligner};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// Identifier column written to the feature table
pub const ID_COLUMN: &str = "Patient_ID";
/// Target column written to the feature table
pub const TARGET_COLUMN: &str = "Readmission";

/// Engineered training table: identifier, numeric features, raw target label
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTable {
    pub columns: Vec<String>,
    pub ids: Vec<Option<String>>,
    pub rows: Vec<Vec<f64>>,
    pub labels: Vec<Option<String>>,
}

impl FeatureTable {
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    /// All values of one feature column
    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let idx = self.columns.iter().position(|c| c == name)?;
        Some(self.rows.iter().map(|row| row[idx]).collect())
    }
}

/// Fitted chain of record transforms
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeaturePipeline {
    config: PipelineConfig,
    cleaner: RecordCleaner,
    enricher: DemographicsEnricher,
    encoder: CategoricalEncoder,
    scaler: NumericScaler,
    is_fitted: bool,
    fitted_at: Option<DateTime<Utc>>,
    n_training_records: usize,
}

impl FeaturePipeline {
    pub fn new(config: PipelineConfig) -> Self {
        let scaler = NumericScaler::new(config.scaler_type);
        Self {
            config,
            cleaner: RecordCleaner::new(),
            enricher: DemographicsEnricher::new(),
            encoder: CategoricalEncoder::new(),
            scaler,
            is_fitted: false,
            fitted_at: None,
            n_training_records: 0,
        }
    }

    /// Fit every stage on the historical records. Runs once per pipeline.
    pub fn fit(&mut self, records: &[RawRecord]) -> Result<&mut Self> {
        if self.is_fitted {
            return Err(ReadmitError::AlreadyFitted("FeaturePipeline"));
        }
        if records.is_empty() {
            return Err(ReadmitError::DataError("no training records to fit on".to_string()));
        }

        let start = Instant::now();
        let mut cleaned = self.cleaner.fit_transform(records)?;
        self.enricher.enrich_all(&mut cleaned);
        self.encoder.fit(&cleaned, &self.config.categorical_fields)?;
        self.scaler.fit(&cleaned, &self.config.scaled_fields)?;

        self.is_fitted = true;
        self.fitted_at = Some(Utc::now());
        self.n_training_records = cleaned.len();

        info!(
            records = records.len(),
            unique_records = cleaned.len(),
            features = self.n_features(),
            scaler = ?self.config.scaler_type,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Feature pipeline fitted"
        );
        Ok(self)
    }

    /// Clean and enrich a batch (deduplicated)
    pub fn prepare(&self, records: &[RawRecord]) -> Vec<CleanedRecord> {
        let mut cleaned = self.cleaner.transform(records);
        self.enricher.enrich_all(&mut cleaned);
        cleaned
    }

    /// Clean and enrich a single record
    pub fn prepare_record(&self, record: &RawRecord) -> CleanedRecord {
        let mut cleaned = self.cleaner.clean_record(record);
        self.enricher.enrich(&mut cleaned);
        cleaned
    }

    /// Named feature columns for one prepared record:
    /// passthrough numerics, then one-hot blocks, then scaled numerics
    pub fn produce(&self, record: &CleanedRecord) -> Result<ProducedFeatures> {
        if !self.is_fitted {
            return Err(ReadmitError::ModelNotFitted);
        }

        let mut produced = ProducedFeatures::new();
        for field in &self.config.passthrough_fields {
            produced.push(field.column_name(), field.value(record).unwrap_or(0.0));
        }
        produced.extend(self.encoder.transform(record)?);
        produced.extend(self.scaler.transform(record)?);
        Ok(produced)
    }

    /// Column names in the order [`produce`](Self::produce) emits them
    pub fn feature_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .config
            .passthrough_fields
            .iter()
            .map(|f| f.column_name().to_string())
            .collect();
        names.extend(self.encoder.feature_names());
        names.extend(self.scaler.feature_names());
        names
    }

    pub fn n_features(&self) -> usize {
        self.config.passthrough_fields.len() + self.encoder.n_columns() + self.config.scaled_fields.len()
    }

    /// Build the engineered feature table for a batch of raw records
    pub fn transform(&self, records: &[RawRecord]) -> Result<FeatureTable> {
        let cleaned = self.prepare(records);
        let columns = self.feature_names();

        let mut ids = Vec::with_capacity(cleaned.len());
        let mut rows = Vec::with_capacity(cleaned.len());
        let mut labels = Vec::with_capacity(cleaned.len());
        for record in &cleaned {
            rows.push(self.produce(record)?.values());
            ids.push(record.patient_id.clone());
            labels.push(record.readmission.clone());
        }

        Ok(FeatureTable { columns, ids, rows, labels })
    }

    pub fn fit_transform(&mut self, records: &[RawRecord]) -> Result<FeatureTable> {
        self.fit(records)?;
        self.transform(records)
    }

    /// Replay the fitted chain on one record and align it to `schema`
    pub fn vectorize(&self, record: &RawRecord, schema: &FeatureSchema) -> Result<AlignedVector> {
        let prepared = self.prepare_record(record);
        let produced = self.produce(&prepared)?;
        SchemaAligner::new(schema, self.config.alignment_mode).align(&produced)
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn cleaner(&self) -> &RecordCleaner {
        &self.cleaner
    }

    pub fn encoder(&self) -> &CategoricalEncoder {
        &self.encoder
    }

    pub fn scaler(&self) -> &NumericScaler {
        &self.scaler
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }

    pub fn fitted_at(&self) -> Option<DateTime<Utc>> {
        self.fitted_at
    }

    pub fn n_training_records(&self) -> usize {
        self.n_training_records
    }

    /// Save the fitted pipeline to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load a pipeline from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let pipeline: Self = serde_json::from_str(&json)?;
        Ok(pipeline)
    }
}

impl Default for FeaturePipeline {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}
