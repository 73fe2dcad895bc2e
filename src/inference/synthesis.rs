//! Direct synthesis: build the feature vector straight from a typed request
//! using lookup tables extracted from a loaded artifact.

use super::request::PatientInput;
use crate::error::{ReadmitError, Result};
use crate::export::ModelArtifact;
use crate::preprocessing::{CategoricalField, DemographicsEnricher, FieldCategories, NumericField, ScalerParams};
use crate::schema::{AlignedVector, AlignmentMode, FeatureSchema, ProducedFeatures, SchemaAligner};

/// Category lists and scaling constants snapshotted from one artifact.
/// Bound to that artifact's schema fingerprint.
#[derive(Debug, Clone)]
pub struct DirectSynthesizer {
    fingerprint: String,
    passthrough: Vec<NumericField>,
    blocks: Vec<FieldCategories>,
    scaled: Vec<ScalerParams>,
    satisfaction_median: Option<f64>,
    mode: AlignmentMode,
}

impl DirectSynthesizer {
    pub fn from_artifact(artifact: &ModelArtifact) -> Result<Self> {
        let pipeline = &artifact.pipeline;
        if !pipeline.is_fitted() {
            return Err(ReadmitError::ModelNotFitted);
        }
        Ok(Self {
            fingerprint: artifact.schema.fingerprint().to_string(),
            passthrough: pipeline.config().passthrough_fields.clone(),
            blocks: pipeline.encoder().blocks().to_vec(),
            scaled: pipeline.scaler().all_params().to_vec(),
            satisfaction_median: pipeline.cleaner().satisfaction_median(),
            mode: pipeline.config().alignment_mode,
        })
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    fn numeric(&self, field: NumericField, input: &PatientInput) -> Option<f64> {
        match field {
            NumericField::Age => Some(input.age),
            NumericField::StayLength => input.resolved_stay(),
            NumericField::TotalCost => Some(input.total_cost),
            NumericField::Satisfaction => input.satisfaction.or(self.satisfaction_median),
            NumericField::InsuranceClaimed => input.insurance_claimed.map(|f| if f { 1.0 } else { 0.0 }),
        }
    }

    fn categorical<'a>(&self, field: CategoricalField, input: &'a PatientInput) -> Option<&'a str> {
        match field {
            CategoricalField::Gender => Some(input.gender.as_str()),
            CategoricalField::Condition => Some(input.condition.as_str()),
            CategoricalField::Medication => Some(input.treatment.as_str()),
            CategoricalField::AgeGroup => DemographicsEnricher::age_band(input.age).map(|b| b.label()),
        }
    }

    /// Build and align the vector. Refuses a schema other than the one the
    /// tables were taken from.
    pub fn vectorize(&self, input: &PatientInput, schema: &FeatureSchema) -> Result<AlignedVector> {
        if schema.fingerprint() != self.fingerprint {
            return Err(ReadmitError::ConfigError(format!(
                "direct synthesizer built for schema {} cannot serve schema {}",
                self.fingerprint,
                schema.fingerprint()
            )));
        }

        let mut produced = ProducedFeatures::new();
        for &field in &self.passthrough {
            produced.push(field.column_name(), self.numeric(field, input).unwrap_or(0.0));
        }
        for block in &self.blocks {
            let value = self.categorical(block.field, input);
            produced.extend(block.column_names().zip(block.indicators(value)));
        }
        for params in &self.scaled {
            produced.push(params.field.column_name(), params.apply(self.numeric(params.field, input)));
        }

        SchemaAligner::new(schema, self.mode).align(&produced)
    }
}
