//! Inference module
//!
//! Turns a partial patient request into a prediction:
//! - Field coercion and documented neutral defaults
//! - Pipeline replay through the fitted feature pipeline (canonical)
//! - Direct synthesis from artifact-derived tables, bound to the schema fingerprint
//! - Schema alignment and classification

mod engine;
mod request;
mod synthesis;

pub use engine::{InferenceAdapter, InferenceStrategy, Prediction, NEGATIVE_MESSAGE, POSITIVE_MESSAGE};
pub use request::{
    PatientInput, PatientRequest, DEFAULT_AGE, DEFAULT_CONDITION, DEFAULT_GENDER, DEFAULT_TOTAL_COST,
    DEFAULT_TREATMENT,
};
pub use synthesis::DirectSynthesizer;
