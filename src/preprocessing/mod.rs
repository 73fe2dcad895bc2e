//! Feature engineering for patient records
//!
//! Provides the training/serving feature chain:
//! - Record cleaning (deduplication, date parsing, stay reconciliation, imputation)
//! - Demographic enrichment (age bands)
//! - One-hot encoding with a frozen category space
//! - Numeric scaling with frozen statistics (Standard, MinMax)
//! - The fitted [`FeaturePipeline`] tying them together

mod config;
mod record;
mod scaler;
mod encoder;
mod pipeline;
pub mod cleaner;
pub mod demographics;

pub use config::PipelineConfig;
pub use record::{CategoricalField, CleanedRecord, NumericField, RawField, RawRecord};
pub use cleaner::RecordCleaner;
pub use demographics::{AgeBand, DemographicsEnricher};
pub use encoder::{indicator_name, CategoricalEncoder, FieldCategories};
pub use scaler::{NumericScaler, ScalerParams, ScalerType};
pub use pipeline::{FeaturePipeline, FeatureTable, ID_COLUMN, TARGET_COLUMN};
