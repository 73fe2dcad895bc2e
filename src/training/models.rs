//! Evaluation metrics for the readmission classifier

use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Binary confusion counts, positive class = readmitted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub true_positive: usize,
    pub false_positive: usize,
    pub true_negative: usize,
    pub false_negative: usize,
}

impl ConfusionMatrix {
    pub fn from_predictions(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Self {
        let mut matrix = Self::default();
        for (t, p) in y_true.iter().zip(y_pred.iter()) {
            match (*t > 0.5, *p > 0.5) {
                (true, true) => matrix.true_positive += 1,
                (false, true) => matrix.false_positive += 1,
                (false, false) => matrix.true_negative += 1,
                (true, false) => matrix.false_negative += 1,
            }
        }
        matrix
    }

    pub fn total(&self) -> usize {
        self.true_positive + self.false_positive + self.true_negative + self.false_negative
    }

    /// Rows are actual [0, 1], columns predicted [0, 1]
    pub fn as_rows(&self) -> [[usize; 2]; 2] {
        [
            [self.true_negative, self.false_positive],
            [self.false_negative, self.true_positive],
        ]
    }
}

/// Model evaluation metrics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub confusion_matrix: ConfusionMatrix,
    /// Training time in seconds
    pub training_time_secs: f64,
    /// Number of features
    pub n_features: usize,
    /// Rows used to fit the classifier
    pub n_train_samples: usize,
    /// Rows the metrics were computed on
    pub n_test_samples: usize,
}

impl ModelMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute classification metrics; precision/recall/F1 are for the positive class
    pub fn compute_classification(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Self {
        let confusion = ConfusionMatrix::from_predictions(y_true, y_pred);
        let tp = confusion.true_positive as f64;
        let fp = confusion.false_positive as f64;
        let fn_ = confusion.false_negative as f64;

        let accuracy = if confusion.total() > 0 {
            (confusion.true_positive + confusion.true_negative) as f64 / confusion.total() as f64
        } else {
            0.0
        };
        let precision = if tp + fp > 0.0 { tp / (tp + fp) } else { 0.0 };
        let recall = if tp + fn_ > 0.0 { tp / (tp + fn_) } else { 0.0 };
        let f1_score = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };

        Self {
            accuracy,
            precision,
            recall,
            f1_score,
            confusion_matrix: confusion,
            n_test_samples: confusion.total(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_classification_metrics() {
        let y_true = array![1.0, 1.0, 0.0, 0.0, 1.0];
        let y_pred = array![1.0, 0.0, 0.0, 1.0, 1.0];
        let metrics = ModelMetrics::compute_classification(&y_true, &y_pred);

        assert!((metrics.accuracy - 0.6).abs() < 1e-12);
        assert!((metrics.precision - 2.0 / 3.0).abs() < 1e-12);
        assert!((metrics.recall - 2.0 / 3.0).abs() < 1e-12);
        assert!((metrics.f1_score - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(metrics.confusion_matrix.as_rows(), [[1, 1], [1, 2]]);
        assert_eq!(metrics.n_test_samples, 5);
    }

    #[test]
    fn test_no_positive_predictions() {
        let y_true = array![1.0, 0.0];
        let y_pred = array![0.0, 0.0];
        let metrics = ModelMetrics::compute_classification(&y_true, &y_pred);
        assert_eq!(metrics.precision, 0.0);
        assert_eq!(metrics.f1_score, 0.0);
    }
}
