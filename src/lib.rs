//! Readmission Risk - hospital readmission prediction
//!
//! This crate provides a training/serving pipeline with a frozen feature
//! contract:
//! - Record cleaning, age banding, one-hot encoding and scaling
//! - A versioned, fingerprinted feature schema
//! - Logistic regression training with stratified evaluation
//! - Prediction from partial requests with documented defaults
//! - HTTP server and CLI interfaces
//!
//! # Modules
//!
//! ## Core
//! - [`preprocessing`] - Cleaner, enricher, encoder, scaler and the fitted pipeline
//! - [`schema`] - Ordered feature schema and alignment
//! - [`training`] - Label mapping, classifier, training engine
//! - [`inference`] - Request coercion, pipeline replay, direct synthesis
//! - [`export`] - The persisted model artifact
//!
//! ## Services
//! - [`server`] - HTTP server
//! - [`cli`] - Command-line interface
//!
//! ## Utilities
//! - [`utils`] - CSV loading and writing

// Core error handling
pub mod error;

// Core modules
pub mod preprocessing;
pub mod schema;
pub mod training;
pub mod inference;
pub mod export;

// Utilities
pub mod utils;

// Services
pub mod server;
pub mod cli;

pub use error::{ReadmitError, Result};

/// Re-export commonly used types
pub mod prelude {
    // Error handling
    pub use crate::error::{ReadmitError, Result};

    // Preprocessing
    pub use crate::preprocessing::{
        CategoricalField, FeaturePipeline, FeatureTable, NumericField, PipelineConfig, RawField, RawRecord,
        ScalerType,
    };

    // Schema
    pub use crate::schema::{AlignmentMode, FeatureSchema, SchemaAligner};

    // Training
    pub use crate::training::{ModelMetrics, ReadmissionClassifier, TrainEngine, TrainingConfig};

    // Inference
    pub use crate::inference::{InferenceAdapter, InferenceStrategy, PatientRequest, Prediction};

    // Export
    pub use crate::export::ModelArtifact;

    // Data I/O
    pub use crate::utils::data_loader::{load_feature_table, load_raw_records, write_feature_table, LabeledTable};
}
