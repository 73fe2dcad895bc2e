//! Training engine: feature table + fitted pipeline → model artifact

use super::classifier::ReadmissionClassifier;
use super::labels::encode_labels;
use super::{ModelMetrics, TrainingConfig};
use crate::error::{ReadmitError, Result};
use crate::export::ModelArtifact;
use crate::preprocessing::FeaturePipeline;
use crate::schema::FeatureSchema;
use crate::utils::data_loader::{load_feature_table, LabeledTable};
use ndarray::{Array1, Array2, Axis};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

/// Row indices of a train/test split
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainTestSplit {
    pub train_indices: Vec<usize>,
    pub test_indices: Vec<usize>,
}

/// Offline training run
#[derive(Debug, Clone, Default)]
pub struct TrainEngine {
    config: TrainingConfig,
}

impl TrainEngine {
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Train from a persisted feature table and pipeline
    pub fn train_from_files(
        &self,
        features_path: impl AsRef<Path>,
        pipeline_path: impl AsRef<Path>,
    ) -> Result<ModelArtifact> {
        let table = load_feature_table(features_path, &self.config.target_candidates)?;
        let pipeline = FeaturePipeline::load(pipeline_path)?;
        self.train(&table, pipeline)
    }

    /// Fit the classifier on `table` and bundle it with `pipeline` into an artifact.
    /// The table's columns become the frozen feature schema and must be exactly
    /// the columns the pipeline produces.
    pub fn train(&self, table: &LabeledTable, pipeline: FeaturePipeline) -> Result<ModelArtifact> {
        let start = Instant::now();

        if table.columns.is_empty() {
            return Err(ReadmitError::TrainingError("feature table has no numeric feature columns".to_string()));
        }
        let schema = FeatureSchema::new(table.columns.clone())?;
        schema.ensure_matches(&pipeline.feature_names())?;

        let encoded = encode_labels(&table.labels);
        let kept: Vec<usize> = encoded
            .values
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.map(|_| i))
            .collect();
        if encoded.n_dropped() > 0 {
            warn!(dropped = encoded.n_dropped(), "Dropping rows with missing or unmapped target");
        }
        if kept.is_empty() {
            return Err(ReadmitError::TrainingError("no rows with a usable target".to_string()));
        }

        let x = table.features.select(Axis(0), &kept);
        let y: Array1<f64> = kept.iter().filter_map(|&i| encoded.values[i]).collect();

        let split = self.stratified_split(&y)?;
        let (x_train, y_train) = take_rows(&x, &y, &split.train_indices);
        let (x_test, y_test) = if split.test_indices.is_empty() {
            warn!(rows = y.len(), "Too few rows to hold out a test set; evaluating on training rows");
            (x_train.clone(), y_train.clone())
        } else {
            take_rows(&x, &y, &split.test_indices)
        };

        let mut classifier = ReadmissionClassifier::new(&self.config);
        classifier.fit(&x_train, &y_train)?;

        let y_pred = classifier.predict_batch(&x_test)?;
        let mut metrics = ModelMetrics::compute_classification(&y_test, &y_pred);
        metrics.training_time_secs = start.elapsed().as_secs_f64();
        metrics.n_features = schema.len();
        metrics.n_train_samples = y_train.len();

        info!(
            accuracy = metrics.accuracy,
            precision = metrics.precision,
            recall = metrics.recall,
            f1 = metrics.f1_score,
            confusion = ?metrics.confusion_matrix.as_rows(),
            train_rows = metrics.n_train_samples,
            test_rows = metrics.n_test_samples,
            iterations = classifier.n_iter(),
            "Classifier trained"
        );

        ModelArtifact::new(
            schema,
            pipeline,
            classifier,
            metrics,
            encoded.strategy,
            table.target_column.clone(),
        )
    }

    /// Per-class seeded shuffle; each class contributes `test_size` of its rows
    /// (rounded, at least one when the class has two or more rows).
    pub fn stratified_split(&self, y: &Array1<f64>) -> Result<TrainTestSplit> {
        let test_size = self.config.test_size;
        if !(0.0..1.0).contains(&test_size) {
            return Err(ReadmitError::InvalidParameter {
                name: "test_size".to_string(),
                value: test_size.to_string(),
                reason: "must be in [0, 1)".to_string(),
            });
        }

        let mut class_indices: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
        for (i, &label) in y.iter().enumerate() {
            class_indices.entry(label.round() as i64).or_default().push(i);
        }

        let mut rng = ChaCha8Rng::seed_from_u64(self.config.random_state);
        let mut train_indices = Vec::new();
        let mut test_indices = Vec::new();

        for indices in class_indices.values_mut() {
            indices.shuffle(&mut rng);
            let n = indices.len();
            let n_test = if test_size > 0.0 && n >= 2 {
                ((n as f64 * test_size).round() as usize).clamp(1, n - 1)
            } else {
                0
            };
            test_indices.extend_from_slice(&indices[..n_test]);
            train_indices.extend_from_slice(&indices[n_test..]);
        }

        train_indices.sort_unstable();
        test_indices.sort_unstable();
        Ok(TrainTestSplit { train_indices, test_indices })
    }
}

fn take_rows(x: &Array2<f64>, y: &Array1<f64>, indices: &[usize]) -> (Array2<f64>, Array1<f64>) {
    (x.select(Axis(0), indices), y.select(Axis(0), indices))
}
