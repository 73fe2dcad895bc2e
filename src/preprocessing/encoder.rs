//! One-hot encoding of nominal fields with a frozen category space

use super::record::{CategoricalField, CleanedRecord};
use crate::error::{ReadmitError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

/// Categories observed for one field during fit, in column order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldCategories {
    pub field: CategoricalField,
    pub categories: Vec<String>,
}

impl FieldCategories {
    pub fn column_names(&self) -> impl Iterator<Item = String> + '_ {
        self.categories
            .iter()
            .map(move |category| indicator_name(self.field, category))
    }

    /// Indicator block for a value; unseen or missing values give all zeros
    pub fn indicators(&self, value: Option<&str>) -> Vec<f64> {
        self.categories
            .iter()
            .map(|category| if value == Some(category.as_str()) { 1.0 } else { 0.0 })
            .collect()
    }
}

/// Name of the indicator column for a (field, category) pair
pub fn indicator_name(field: CategoricalField, category: &str) -> String {
    format!("{}_{}", field.column_name(), category)
}

/// One-hot encoder. Fitting happens exactly once; afterwards the category
/// space never grows.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoricalEncoder {
    fields: Vec<FieldCategories>,
    is_fitted: bool,
}

impl CategoricalEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the sorted set of values observed for each field
    pub fn fit(&mut self, records: &[CleanedRecord], fields: &[CategoricalField]) -> Result<&mut Self> {
        if self.is_fitted {
            return Err(ReadmitError::AlreadyFitted("CategoricalEncoder"));
        }

        self.fields = fields
            .iter()
            .map(|&field| {
                let observed: BTreeSet<&str> =
                    records.iter().filter_map(|r| field.value(r)).collect();
                FieldCategories {
                    field,
                    categories: observed.into_iter().map(str::to_string).collect(),
                }
            })
            .collect();
        self.is_fitted = true;

        debug!(
            fields = self.fields.len(),
            columns = self.n_columns(),
            "Categorical encoder fitted"
        );
        Ok(self)
    }

    /// Indicator columns for one record, in fit order
    pub fn transform(&self, record: &CleanedRecord) -> Result<Vec<(String, f64)>> {
        if !self.is_fitted {
            return Err(ReadmitError::ModelNotFitted);
        }

        let mut columns = Vec::with_capacity(self.n_columns());
        for block in &self.fields {
            let value = block.field.value(record);
            if let Some(v) = value {
                if !block.categories.iter().any(|c| c == v) {
                    debug!(field = block.field.column_name(), value = v, "Unseen category encoded as zeros");
                }
            }
            columns.extend(block.column_names().zip(block.indicators(value)));
        }
        Ok(columns)
    }

    pub fn feature_names(&self) -> Vec<String> {
        self.fields.iter().flat_map(|b| b.column_names()).collect()
    }

    pub fn categories(&self, field: CategoricalField) -> Option<&[String]> {
        self.fields
            .iter()
            .find(|b| b.field == field)
            .map(|b| b.categories.as_slice())
    }

    pub fn blocks(&self) -> &[FieldCategories] {
        &self.fields
    }

    pub fn n_columns(&self) -> usize {
        self.fields.iter().map(|b| b.categories.len()).sum()
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }
}
