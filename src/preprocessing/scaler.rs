//! Feature scaling with statistics frozen at training time

use super::record::{CleanedRecord, NumericField};
use crate::error::{ReadmitError, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Type of scaler to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScalerType {
    /// Standard scaling (z-score normalization): (x - mean) / std
    Standard,
    /// Min-Max scaling: (x - min) / (max - min)
    MinMax,
}

impl ScalerType {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "standard" => Some(ScalerType::Standard),
            "minmax" | "min_max" => Some(ScalerType::MinMax),
            _ => None,
        }
    }
}

/// Frozen statistics for one column
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScalerParams {
    pub field: NumericField,
    /// mean or min
    pub center: f64,
    /// std or range
    pub scale: f64,
}

impl ScalerParams {
    /// `scale == 0` and missing input both map to 0
    pub fn apply(&self, value: Option<f64>) -> f64 {
        match value {
            Some(v) if self.scale != 0.0 => (v - self.center) / self.scale,
            _ => 0.0,
        }
    }
}

/// Numeric feature scaler
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NumericScaler {
    scaler_type: ScalerType,
    params: Vec<ScalerParams>,
    is_fitted: bool,
}

impl NumericScaler {
    pub fn new(scaler_type: ScalerType) -> Self {
        Self {
            scaler_type,
            params: Vec::new(),
            is_fitted: false,
        }
    }

    /// Compute and freeze per-column statistics. Missing values are ignored.
    pub fn fit(&mut self, records: &[CleanedRecord], fields: &[NumericField]) -> Result<&mut Self> {
        if self.is_fitted {
            return Err(ReadmitError::AlreadyFitted("NumericScaler"));
        }

        self.params = fields
            .iter()
            .map(|&field| {
                let values: Vec<f64> = records.iter().filter_map(|r| field.value(r)).collect();
                self.compute_params(field, &values)
            })
            .collect();
        self.is_fitted = true;

        for p in &self.params {
            debug!(column = p.field.column_name(), center = p.center, scale = p.scale, "Scaler column frozen");
        }
        Ok(self)
    }

    /// Scaled columns for one record, in fit order
    pub fn transform(&self, record: &CleanedRecord) -> Result<Vec<(String, f64)>> {
        if !self.is_fitted {
            return Err(ReadmitError::ModelNotFitted);
        }

        Ok(self
            .params
            .iter()
            .map(|p| (p.field.column_name().to_string(), p.apply(p.field.value(record))))
            .collect())
    }

    /// Inverse of [`transform`](Self::transform) for a single value
    pub fn inverse(&self, field: NumericField, scaled: f64) -> Option<f64> {
        self.params(field).map(|p| scaled * p.scale + p.center)
    }

    fn compute_params(&self, field: NumericField, values: &[f64]) -> ScalerParams {
        if values.is_empty() {
            return ScalerParams { field, center: 0.0, scale: 0.0 };
        }

        match self.scaler_type {
            ScalerType::Standard => {
                let n = values.len() as f64;
                let mean = values.iter().sum::<f64>() / n;
                // population std (ddof = 0)
                let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
                ScalerParams { field, center: mean, scale: var.sqrt() }
            }
            ScalerType::MinMax => {
                let min = values.iter().copied().fold(f64::INFINITY, f64::min);
                let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                ScalerParams { field, center: min, scale: max - min }
            }
        }
    }

    pub fn params(&self, field: NumericField) -> Option<&ScalerParams> {
        self.params.iter().find(|p| p.field == field)
    }

    pub fn all_params(&self) -> &[ScalerParams] {
        &self.params
    }

    pub fn feature_names(&self) -> Vec<String> {
        self.params.iter().map(|p| p.field.column_name().to_string()).collect()
    }

    pub fn scaler_type(&self) -> ScalerType {
        self.scaler_type
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }
}
