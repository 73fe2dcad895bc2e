//! Target label mapping

use serde::{Deserialize, Serialize};
use tracing::warn;

/// How raw target values were turned into class indices
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LabelStrategy {
    /// Yes/No/Y/N (case-insensitive) and numeric values
    Mapped,
    /// No value mapped; classes indexed by first appearance
    Factorized { classes: Vec<String> },
}

/// Encoded targets, `None` where the row is dropped
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedLabels {
    pub strategy: LabelStrategy,
    pub values: Vec<Option<f64>>,
}

impl EncodedLabels {
    pub fn n_dropped(&self) -> usize {
        self.values.iter().filter(|v| v.is_none()).count()
    }
}

/// Map a single raw label; `None` when it is neither yes/no nor numeric
pub fn map_label(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    match trimmed.to_ascii_lowercase().as_str() {
        "yes" | "y" => Some(1.0),
        "no" | "n" => Some(0.0),
        "" => None,
        _ => trimmed.parse::<f64>().ok().filter(|v| v.is_finite()),
    }
}

/// Encode the raw target column
pub fn encode_labels(raw: &[Option<String>]) -> EncodedLabels {
    let mapped: Vec<Option<f64>> = raw
        .iter()
        .map(|label| label.as_deref().and_then(map_label))
        .collect();

    if mapped.iter().any(Option::is_some) {
        return EncodedLabels {
            strategy: LabelStrategy::Mapped,
            values: mapped,
        };
    }

    let mut classes: Vec<String> = Vec::new();
    let values = raw
        .iter()
        .map(|label| {
            let label = label.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
            let idx = match classes.iter().position(|c| c == label) {
                Some(idx) => idx,
                None => {
                    classes.push(label.to_string());
                    classes.len() - 1
                }
            };
            Some(idx as f64)
        })
        .collect();

    if !classes.is_empty() {
        warn!(classes = ?classes, "Target values are not yes/no or numeric; using first-appearance index encoding");
    }

    EncodedLabels {
        strategy: LabelStrategy::Factorized { classes },
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(values: &[Option<&str>]) -> Vec<Option<String>> {
        values.iter().map(|v| v.map(str::to_string)).collect()
    }

    #[test]
    fn test_yes_no_mapping() {
        let encoded = encode_labels(&labels(&[Some("Yes"), Some("no"), Some("Y"), Some("n"), None]));
        assert_eq!(encoded.strategy, LabelStrategy::Mapped);
        assert_eq!(encoded.values, vec![Some(1.0), Some(0.0), Some(1.0), Some(0.0), None]);
        assert_eq!(encoded.n_dropped(), 1);
    }

    #[test]
    fn test_numeric_labels_used_as_is() {
        let encoded = encode_labels(&labels(&[Some("1"), Some("0"), Some("1.0")]));
        assert_eq!(encoded.values, vec![Some(1.0), Some(0.0), Some(1.0)]);
    }

    #[test]
    fn test_unmapped_rows_dropped_when_others_map() {
        let encoded = encode_labels(&labels(&[Some("Yes"), Some("maybe"), Some("No")]));
        assert_eq!(encoded.values, vec![Some(1.0), None, Some(0.0)]);
    }

    #[test]
    fn test_factorize_fallback() {
        let encoded = encode_labels(&labels(&[Some("Readmitted"), Some("Home"), Some("Readmitted")]));
        assert_eq!(
            encoded.strategy,
            LabelStrategy::Factorized {
                classes: vec!["Readmitted".to_string(), "Home".to_string()]
            }
        );
        assert_eq!(encoded.values, vec![Some(0.0), Some(1.0), Some(0.0)]);
    }
}
