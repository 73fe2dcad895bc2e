//! Alignment of produced feature columns onto a [`FeatureSchema`]

use super::FeatureSchema;
use crate::error::{ReadmitError, Result};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// How alignment reacts to missing or unexpected columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AlignmentMode {
    /// Any difference from the schema is a [`ReadmitError::SchemaMismatch`]
    #[default]
    Strict,
    /// Differences are zero-filled / dropped and logged as warnings
    Lenient,
}

/// Named columns produced by the feature pipeline for one record, in
/// production order. Order only matters when deriving a schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProducedFeatures {
    columns: Vec<(String, f64)>,
}

impl ProducedFeatures {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild named columns from a vector already aligned to `schema`
    pub fn from_aligned(schema: &FeatureSchema, values: &Array1<f64>) -> Result<Self> {
        if values.len() != schema.len() {
            return Err(ReadmitError::ShapeError {
                expected: format!("{} values", schema.len()),
                actual: format!("{} values", values.len()),
            });
        }
        Ok(Self {
            columns: schema.columns().iter().cloned().zip(values.iter().copied()).collect(),
        })
    }

    pub fn push(&mut self, name: impl Into<String>, value: f64) {
        self.columns.push((name.into(), value));
    }

    pub fn extend(&mut self, columns: impl IntoIterator<Item = (String, f64)>) {
        self.columns.extend(columns);
    }

    /// First value produced under `name`
    pub fn get(&self, name: &str) -> Option<f64> {
        self.columns.iter().find(|(n, _)| n == name).map(|(_, v)| *v)
    }

    pub fn names(&self) -> Vec<String> {
        self.columns.iter().map(|(n, _)| n.clone()).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.columns.iter().map(|(_, v)| *v).collect()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Which schema columns were zero-filled and which produced columns were dropped
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignmentReport {
    pub missing: Vec<String>,
    pub extra: Vec<String>,
}

impl AlignmentReport {
    /// Set comparison of produced names against the schema
    pub fn compare<'a>(schema: &FeatureSchema, produced: impl Iterator<Item = &'a str>) -> Self {
        let produced: Vec<&str> = produced.collect();
        let produced_set: HashSet<&str> = produced.iter().copied().collect();
        let schema_set: HashSet<&str> = schema.columns().iter().map(String::as_str).collect();

        let missing = schema
            .columns()
            .iter()
            .filter(|c| !produced_set.contains(c.as_str()))
            .cloned()
            .collect();

        let mut seen = HashSet::new();
        let extra = produced
            .into_iter()
            .filter(|c| !schema_set.contains(c) && seen.insert(*c))
            .map(str::to_string)
            .collect();

        Self { missing, extra }
    }

    pub fn is_exact(&self) -> bool {
        self.missing.is_empty() && self.extra.is_empty()
    }
}

/// A vector in schema order plus the reconciliation that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedVector {
    pub values: Array1<f64>,
    pub report: AlignmentReport,
}

/// Maps produced columns onto the schema: present columns are copied,
/// absent ones are zero, unknown ones are dropped.
#[derive(Debug, Clone, Copy)]
pub struct SchemaAligner<'a> {
    schema: &'a FeatureSchema,
    mode: AlignmentMode,
}

impl<'a> SchemaAligner<'a> {
    pub fn new(schema: &'a FeatureSchema, mode: AlignmentMode) -> Self {
        Self { schema, mode }
    }

    pub fn align(&self, produced: &ProducedFeatures) -> Result<AlignedVector> {
        let report = AlignmentReport::compare(self.schema, produced.columns.iter().map(|(n, _)| n.as_str()));

        if !report.is_exact() {
            match self.mode {
                AlignmentMode::Strict => {
                    return Err(ReadmitError::SchemaMismatch {
                        missing: report.missing,
                        extra: report.extra,
                    });
                }
                AlignmentMode::Lenient => {
                    warn!(
                        missing = ?report.missing,
                        extra = ?report.extra,
                        schema_fingerprint = self.schema.fingerprint(),
                        "Produced features differ from schema; zero-filling and dropping"
                    );
                }
            }
        }

        let mut lookup: HashMap<&str, f64> = HashMap::with_capacity(produced.len());
        for (name, value) in &produced.columns {
            lookup.entry(name.as_str()).or_insert(*value);
        }

        let values: Array1<f64> = self
            .schema
            .columns()
            .iter()
            .map(|c| lookup.get(c.as_str()).copied().unwrap_or(0.0))
            .collect();

        Ok(AlignedVector { values, report })
    }

    pub fn schema(&self) -> &FeatureSchema {
        self.schema
    }

    pub fn mode(&self) -> AlignmentMode {
        self.mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> FeatureSchema {
        FeatureSchema::new(vec![
            "Gender_Female".to_string(),
            "Gender_Male".to_string(),
            "Age".to_string(),
        ])
        .unwrap()
    }

    #[test]
    fn test_reorders_into_schema_order() {
        let schema = schema();
        let mut produced = ProducedFeatures::new();
        produced.push("Age", 0.5);
        produced.push("Gender_Male", 1.0);
        produced.push("Gender_Female", 0.0);

        let aligned = SchemaAligner::new(&schema, AlignmentMode::Strict).align(&produced).unwrap();
        assert_eq!(aligned.values.to_vec(), vec![0.0, 1.0, 0.5]);
        assert!(aligned.report.is_exact());
    }

    #[test]
    fn test_strict_mode_surfaces_mismatch() {
        let schema = schema();
        let mut produced = ProducedFeatures::new();
        produced.push("Age", 0.5);
        produced.push("Patient_State", 3.0);

        match SchemaAligner::new(&schema, AlignmentMode::Strict).align(&produced) {
            Err(ReadmitError::SchemaMismatch { missing, extra }) => {
                assert_eq!(missing, vec!["Gender_Female", "Gender_Male"]);
                assert_eq!(extra, vec!["Patient_State"]);
            }
            other => panic!("expected mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_lenient_mode_zero_fills_and_drops() {
        let schema = schema();
        let mut produced = ProducedFeatures::new();
        produced.push("Age", 0.5);
        produced.push("Patient_State", 3.0);

        let aligned = SchemaAligner::new(&schema, AlignmentMode::Lenient).align(&produced).unwrap();
        assert_eq!(aligned.values.to_vec(), vec![0.0, 0.0, 0.5]);
        assert_eq!(aligned.values.len(), schema.len());
        assert_eq!(aligned.report.extra, vec!["Patient_State"]);
    }

    #[test]
    fn test_alignment_is_idempotent() {
        let schema = schema();
        let vector = Array1::from(vec![1.0, 0.0, -0.25]);
        let produced = ProducedFeatures::from_aligned(&schema, &vector).unwrap();

        for mode in [AlignmentMode::Strict, AlignmentMode::Lenient] {
            let aligned = SchemaAligner::new(&schema, mode).align(&produced).unwrap();
            assert_eq!(aligned.values, vector);
            assert!(aligned.report.is_exact());
        }
    }

    #[test]
    fn test_from_aligned_rejects_wrong_length() {
        let schema = schema();
        let vector = Array1::from(vec![1.0, 0.0]);
        assert!(ProducedFeatures::from_aligned(&schema, &vector).is_err());
    }
}
