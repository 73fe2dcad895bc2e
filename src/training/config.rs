//! Training configuration

use serde::{Deserialize, Serialize};

/// Configuration for the offline training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Fraction of each class held out for evaluation
    pub test_size: f64,

    /// Seed for the stratified shuffle
    pub random_state: u64,

    /// Gradient descent iteration cap
    pub max_iter: usize,

    pub learning_rate: f64,

    /// L2 regularization strength
    pub alpha: f64,

    /// Gradient norm at which descent stops early
    #[serde(default = "default_tol")]
    pub tol: f64,

    /// Target column names, first present wins
    pub target_candidates: Vec<String>,
}

fn default_tol() -> f64 {
    1e-6
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            test_size: 0.2,
            random_state: 42,
            max_iter: 5000,
            learning_rate: 0.1,
            alpha: 0.01,
            tol: default_tol(),
            target_candidates: vec![
                "Readmission".to_string(),
                "Readmission_Flag".to_string(),
                "ReadmissionFlag".to_string(),
            ],
        }
    }
}

impl TrainingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_test_size(mut self, test_size: f64) -> Self {
        self.test_size = test_size;
        self
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn with_learning_rate(mut self, lr: f64) -> Self {
        self.learning_rate = lr;
        self
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }
}
