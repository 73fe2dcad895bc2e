//! Model training module
//!
//! Provides the offline training run:
//! - Target label mapping (yes/no, numeric, first-appearance fallback)
//! - Seeded stratified train/test split
//! - Logistic regression classifier over schema-aligned vectors
//! - Evaluation metrics stored in the model artifact

mod config;
mod engine;
mod models;
mod classifier;
pub mod labels;
pub mod linear_models;

pub use config::TrainingConfig;
pub use engine::{TrainEngine, TrainTestSplit};
pub use models::{ConfusionMatrix, ModelMetrics};
pub use classifier::{ReadmissionClassifier, DECISION_THRESHOLD};
pub use labels::{encode_labels, EncodedLabels, LabelStrategy};
pub use linear_models::LogisticRegression;
