//! Feature schema: the frozen, ordered column contract between training and serving
//!
//! A [`FeatureSchema`] is created once from the training feature table and
//! persisted inside the model artifact. Every vector handed to the classifier
//! is built by [`SchemaAligner`] against it.

mod aligner;

pub use aligner::{AlignedVector, AlignmentMode, AlignmentReport, ProducedFeatures, SchemaAligner};

use crate::error::{ReadmitError, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashSet;

/// Layout version of the schema; bump when column naming rules change
pub const SCHEMA_VERSION: u32 = 1;

/// Ordered, immutable list of feature names a model was trained on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSchema {
    version: u32,
    columns: Vec<String>,
    fingerprint: String,
}

impl FeatureSchema {
    /// Build a schema, rejecting empty or duplicated column lists
    pub fn new(columns: Vec<String>) -> Result<Self> {
        if columns.is_empty() {
            return Err(ReadmitError::InvalidParameter {
                name: "columns".to_string(),
                value: "[]".to_string(),
                reason: "a feature schema needs at least one column".to_string(),
            });
        }

        let mut seen = HashSet::with_capacity(columns.len());
        if let Some(dup) = columns.iter().find(|c| !seen.insert(c.as_str())) {
            return Err(ReadmitError::InvalidParameter {
                name: "columns".to_string(),
                value: dup.clone(),
                reason: "duplicate column in feature schema".to_string(),
            });
        }

        let fingerprint = Self::compute_fingerprint(SCHEMA_VERSION, &columns);
        Ok(Self {
            version: SCHEMA_VERSION,
            columns,
            fingerprint,
        })
    }

    /// SHA-256 over the version and the ordered column names
    pub fn compute_fingerprint(version: u32, columns: &[String]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(version.to_le_bytes());
        for column in columns {
            hasher.update((column.len() as u64).to_le_bytes());
            hasher.update(column.as_bytes());
        }
        hex::encode(hasher.finalize())
    }

    /// Re-derive the fingerprint and compare it with the stored one.
    /// Used after deserialization to catch hand-edited or truncated artifacts.
    pub fn verify(&self) -> Result<()> {
        if self.version != SCHEMA_VERSION {
            return Err(ReadmitError::StartupError(format!(
                "unsupported feature schema version {} (expected {})",
                self.version, SCHEMA_VERSION
            )));
        }
        let expected = Self::compute_fingerprint(self.version, &self.columns);
        if expected != self.fingerprint {
            return Err(ReadmitError::StartupError(format!(
                "feature schema fingerprint mismatch: stored {}, computed {}",
                self.fingerprint, expected
            )));
        }
        Ok(())
    }

    /// Exact equality of the ordered column list with another source of names
    pub fn ensure_matches(&self, columns: &[String]) -> Result<()> {
        if self.columns.as_slice() == columns {
            return Ok(());
        }
        let report = AlignmentReport::compare(self, columns.iter().map(String::as_str));
        if report.is_exact() {
            if let Some((position, (expected, found))) = self
                .columns
                .iter()
                .zip(columns)
                .enumerate()
                .find(|(_, (a, b))| a != b)
            {
                return Err(ReadmitError::ColumnOrderMismatch {
                    position,
                    expected: expected.clone(),
                    found: found.clone(),
                });
            }
            // same set and prefix, so the lengths differ through duplicates
            return Err(ReadmitError::ShapeError {
                expected: format!("{} columns", self.columns.len()),
                actual: format!("{} columns", columns.len()),
            });
        }
        Err(ReadmitError::SchemaMismatch {
            missing: report.missing,
            extra: report.extra,
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn index_of(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }
}
