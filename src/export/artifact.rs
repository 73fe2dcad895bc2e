//! The persisted model artifact: schema, fitted pipeline, classifier, metrics

use crate::error::{ReadmitError, Result};
use crate::preprocessing::FeaturePipeline;
use crate::schema::FeatureSchema;
use crate::training::{LabelStrategy, ModelMetrics, ReadmissionClassifier};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Bumped whenever the artifact layout changes
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,
    pub created_at: DateTime<Utc>,
    /// Version of the crate that wrote the artifact
    pub producer_version: String,
    pub schema: FeatureSchema,
    pub pipeline: FeaturePipeline,
    pub classifier: ReadmissionClassifier,
    pub metrics: ModelMetrics,
    pub label_strategy: LabelStrategy,
    pub target_column: String,
}

impl ModelArtifact {
    pub fn new(
        schema: FeatureSchema,
        pipeline: FeaturePipeline,
        classifier: ReadmissionClassifier,
        metrics: ModelMetrics,
        label_strategy: LabelStrategy,
        target_column: impl Into<String>,
    ) -> Result<Self> {
        let artifact = Self {
            format_version: ARTIFACT_FORMAT_VERSION,
            created_at: Utc::now(),
            producer_version: env!("CARGO_PKG_VERSION").to_string(),
            schema,
            pipeline,
            classifier,
            metrics,
            label_strategy,
            target_column: target_column.into(),
        };
        artifact.validate()?;
        Ok(artifact)
    }

    /// Check the pieces agree with each other and with the stored fingerprint
    pub fn validate(&self) -> Result<()> {
        if self.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(ReadmitError::StartupError(format!(
                "artifact format version {} is not supported (expected {})",
                self.format_version, ARTIFACT_FORMAT_VERSION
            )));
        }
        self.schema.verify()?;

        if !self.pipeline.is_fitted() {
            return Err(ReadmitError::StartupError("artifact pipeline is not fitted".to_string()));
        }
        if !self.classifier.is_fitted() {
            return Err(ReadmitError::StartupError("artifact classifier is not fitted".to_string()));
        }
        if self.classifier.n_features() != self.schema.len() {
            return Err(ReadmitError::StartupError(format!(
                "classifier expects {} features but schema has {}",
                self.classifier.n_features(),
                self.schema.len()
            )));
        }
        self.schema
            .ensure_matches(&self.pipeline.feature_names())
            .map_err(|e| ReadmitError::StartupError(format!("pipeline disagrees with schema: {}", e)))
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        info!(
            path = %path.display(),
            features = self.schema.len(),
            schema_fingerprint = self.schema.fingerprint(),
            "Saved model artifact"
        );
        Ok(())
    }

    /// Load and validate. Every failure is a [`ReadmitError::StartupError`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            ReadmitError::StartupError(format!("cannot read model artifact {}: {}", path.display(), e))
        })?;
        let artifact: Self = serde_json::from_str(&json).map_err(|e| {
            ReadmitError::StartupError(format!("corrupt model artifact {}: {}", path.display(), e))
        })?;
        artifact.validate().map_err(|e| match e {
            ReadmitError::StartupError(_) => e,
            other => ReadmitError::StartupError(other.to_string()),
        })?;

        info!(
            path = %path.display(),
            features = artifact.schema.len(),
            schema_fingerprint = artifact.schema.fingerprint(),
            created_at = %artifact.created_at,
            "Loaded model artifact"
        );
        Ok(artifact)
    }
}
