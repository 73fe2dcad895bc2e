//! Feature pipeline configuration

use super::record::{CategoricalField, NumericField};
use super::scaler::ScalerType;
use crate::schema::AlignmentMode;
use serde::{Deserialize, Serialize};

/// Configuration for the feature pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Nominal fields expanded into one-hot indicator blocks
    pub categorical_fields: Vec<CategoricalField>,

    /// Numeric fields scaled with frozen statistics
    pub scaled_fields: Vec<NumericField>,

    /// Numeric fields copied through unscaled (missing becomes 0)
    pub passthrough_fields: Vec<NumericField>,

    /// Scaling strategy for `scaled_fields`
    pub scaler_type: ScalerType,

    /// Reaction to schema differences at alignment time
    pub alignment_mode: AlignmentMode,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            categorical_fields: vec![
                CategoricalField::Gender,
                CategoricalField::Condition,
                CategoricalField::Medication,
                CategoricalField::AgeGroup,
            ],
            scaled_fields: vec![
                NumericField::Age,
                NumericField::StayLength,
                NumericField::TotalCost,
            ],
            passthrough_fields: vec![NumericField::Satisfaction, NumericField::InsuranceClaimed],
            scaler_type: ScalerType::Standard,
            alignment_mode: AlignmentMode::Strict,
        }
    }
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set scaler type
    pub fn with_scaler(mut self, scaler_type: ScalerType) -> Self {
        self.scaler_type = scaler_type;
        self
    }

    /// Builder method to set the encoded fields
    pub fn with_categorical_fields(mut self, fields: Vec<CategoricalField>) -> Self {
        self.categorical_fields = fields;
        self
    }

    /// Builder method to set the passthrough fields
    pub fn with_passthrough_fields(mut self, fields: Vec<NumericField>) -> Self {
        self.passthrough_fields = fields;
        self
    }

    /// Builder method to set alignment mode
    pub fn with_alignment_mode(mut self, mode: AlignmentMode) -> Self {
        self.alignment_mode = mode;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.categorical_fields.len(), 4);
        assert_eq!(config.scaled_fields.len(), 3);
        assert_eq!(config.scaler_type, ScalerType::Standard);
        assert_eq!(config.alignment_mode, AlignmentMode::Strict);
    }

    #[test]
    fn test_builder_pattern() {
        let config = PipelineConfig::new()
            .with_scaler(ScalerType::MinMax)
            .with_categorical_fields(vec![CategoricalField::Gender])
            .with_alignment_mode(AlignmentMode::Lenient);

        assert_eq!(config.scaler_type, ScalerType::MinMax);
        assert_eq!(config.categorical_fields, vec![CategoricalField::Gender]);
        assert_eq!(config.alignment_mode, AlignmentMode::Lenient);
    }
}
