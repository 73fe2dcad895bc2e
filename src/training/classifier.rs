//! Binary readmission classifier over aligned feature vectors

use super::linear_models::LogisticRegression;
use super::TrainingConfig;
use crate::error::{ReadmitError, Result};
use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Decision threshold on the positive-class probability
pub const DECISION_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadmissionClassifier {
    model: LogisticRegression,
    n_features: usize,
    is_fitted: bool,
}

impl ReadmissionClassifier {
    pub fn new(config: &TrainingConfig) -> Self {
        Self {
            model: LogisticRegression::new()
                .with_max_iter(config.max_iter)
                .with_learning_rate(config.learning_rate)
                .with_alpha(config.alpha)
                .with_tol(config.tol),
            n_features: 0,
            is_fitted: false,
        }
    }

    /// Fit on aligned vectors with 0/1 labels
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        if x.ncols() == 0 {
            return Err(ReadmitError::TrainingError("no numeric feature columns".to_string()));
        }

        let classes: BTreeSet<i64> = y.iter().map(|v| v.round() as i64).collect();
        if classes.len() < 2 {
            return Err(ReadmitError::TrainingError(format!(
                "target has {} distinct class(es); at least 2 are required",
                classes.len()
            )));
        }
        if classes.iter().any(|c| *c != 0 && *c != 1) {
            return Err(ReadmitError::TrainingError(format!(
                "binary target expected, found classes {:?}",
                classes
            )));
        }

        self.model.fit(x, y)?;
        self.n_features = x.ncols();
        self.is_fitted = true;
        Ok(self)
    }

    /// Positive-class probability for one aligned vector
    pub fn predict_proba(&self, vector: ArrayView1<f64>) -> Result<f64> {
        self.check_vector(vector.len())?;
        self.model.predict_proba_one(vector)
    }

    /// Hard prediction for one aligned vector
    pub fn predict(&self, vector: ArrayView1<f64>) -> Result<u8> {
        let p = self.predict_proba(vector)?;
        Ok(if p >= DECISION_THRESHOLD { 1 } else { 0 })
    }

    /// Hard predictions for a batch, as 0.0/1.0
    pub fn predict_batch(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        self.check_vector(x.ncols())?;
        self.model.predict(x)
    }

    fn check_vector(&self, width: usize) -> Result<()> {
        if !self.is_fitted {
            return Err(ReadmitError::ModelNotFitted);
        }
        if width != self.n_features {
            return Err(ReadmitError::ShapeError {
                expected: format!("{} features", self.n_features),
                actual: format!("{} features", width),
            });
        }
        Ok(())
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }

    pub fn coefficients(&self) -> Option<&Array1<f64>> {
        self.model.coefficients.as_ref()
    }

    pub fn intercept(&self) -> Option<f64> {
        self.model.intercept
    }

    pub fn n_iter(&self) -> usize {
        self.model.n_iter
    }
}
