//! Inference adapter over a loaded model artifact
//!
//! The artifact is shared read-only behind an `Arc`; predicting never
//! mutates it, so handlers can call into one adapter concurrently.

use super::request::{PatientInput, PatientRequest};
use super::synthesis::DirectSynthesizer;
use crate::error::Result;
use crate::export::ModelArtifact;
use crate::schema::{AlignedVector, AlignmentReport, FeatureSchema};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

pub const POSITIVE_MESSAGE: &str = "Readmission Risk";
pub const NEGATIVE_MESSAGE: &str = "No Readmission Risk";

/// How a request becomes a feature vector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InferenceStrategy {
    /// Replay the fitted feature pipeline on the padded request
    #[default]
    PipelineReplay,
    /// Build columns directly from tables extracted from the artifact
    DirectSynthesis,
}

/// Outcome of one prediction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub label: u8,
    pub probability: f64,
    pub message: &'static str,
    pub defaults_applied: Vec<String>,
    pub alignment: AlignmentReport,
}

#[derive(Debug, Clone)]
pub struct InferenceAdapter {
    artifact: Arc<ModelArtifact>,
    strategy: InferenceStrategy,
    synthesizer: Option<DirectSynthesizer>,
}

impl InferenceAdapter {
    /// Adapter using pipeline replay
    pub fn new(artifact: Arc<ModelArtifact>) -> Self {
        Self {
            artifact,
            strategy: InferenceStrategy::PipelineReplay,
            synthesizer: None,
        }
    }

    pub fn with_strategy(artifact: Arc<ModelArtifact>, strategy: InferenceStrategy) -> Result<Self> {
        let synthesizer = match strategy {
            InferenceStrategy::PipelineReplay => None,
            InferenceStrategy::DirectSynthesis => Some(DirectSynthesizer::from_artifact(&artifact)?),
        };
        Ok(Self { artifact, strategy, synthesizer })
    }

    /// Load an artifact from disk and wrap it
    pub fn load(path: impl AsRef<Path>, strategy: InferenceStrategy) -> Result<Self> {
        let artifact = Arc::new(ModelArtifact::load(path)?);
        Self::with_strategy(artifact, strategy)
    }

    /// Aligned feature vector for a typed input
    pub fn vectorize(&self, input: &PatientInput) -> Result<AlignedVector> {
        match &self.synthesizer {
            Some(synthesizer) => synthesizer.vectorize(input, &self.artifact.schema),
            None => self
                .artifact
                .pipeline
                .vectorize(&input.to_raw_record(), &self.artifact.schema),
        }
    }

    pub fn predict(&self, request: &PatientRequest) -> Result<Prediction> {
        let start = Instant::now();
        let input = request.resolve()?;
        let vector = self.vectorize(&input)?;

        let probability = self.artifact.classifier.predict_proba(vector.values.view())?;
        let label = self.artifact.classifier.predict(vector.values.view())?;
        let message = if label == 1 { POSITIVE_MESSAGE } else { NEGATIVE_MESSAGE };

        debug!(
            label,
            probability,
            defaults = ?input.defaults_applied,
            strategy = ?self.strategy,
            elapsed_us = start.elapsed().as_micros() as u64,
            "Prediction served"
        );

        Ok(Prediction {
            label,
            probability,
            message,
            defaults_applied: input.defaults_applied,
            alignment: vector.report,
        })
    }

    pub fn artifact(&self) -> &ModelArtifact {
        &self.artifact
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.artifact.schema
    }

    pub fn strategy(&self) -> InferenceStrategy {
        self.strategy
    }
}
