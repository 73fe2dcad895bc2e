//! Record cleaning: deduplication, soft coercion, stay reconciliation and
//! satisfaction imputation

use super::record::{CleanedRecord, RawRecord};
use crate::error::Result;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info};

/// Day-first formats are tried before ISO so that `03-04-2024` is 3 April.
const DATE_FORMATS: &[&str] = &["%d-%m-%Y", "%d/%m/%Y", "%d.%m.%Y", "%Y-%m-%d", "%Y/%m/%d"];
const DATETIME_FORMATS: &[&str] = &[
    "%d-%m-%Y %H:%M:%S",
    "%d-%m-%Y %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
];

/// Parse a date leniently. Unparseable input is treated as missing.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|dt| dt.date())
        })
}

/// Parse a finite number; anything else is missing
pub fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a yes/no style flag
pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "yes" | "y" | "true" | "1" | "1.0" => Some(true),
        "no" | "n" | "false" | "0" | "0.0" => Some(false),
        _ => None,
    }
}

fn non_empty(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}

/// Drop exact duplicate rows, keeping the first occurrence and the input order
pub fn dedup(records: &[RawRecord]) -> Vec<RawRecord> {
    let mut seen = HashSet::with_capacity(records.len());
    records
        .iter()
        .filter(|record| seen.insert(*record))
        .cloned()
        .collect()
}

fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}

/// Normalizes raw records into [`CleanedRecord`]s.
///
/// The only learned state is the satisfaction median, computed by [`fit`](Self::fit)
/// from the training distribution and reused verbatim afterwards.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordCleaner {
    satisfaction_median: Option<f64>,
    is_fitted: bool,
}

impl RecordCleaner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Freeze the satisfaction median from the (deduplicated) training records
    pub fn fit(&mut self, records: &[RawRecord]) -> Result<&mut Self> {
        let mut observed: Vec<f64> = dedup(records)
            .iter()
            .filter_map(|r| r.satisfaction.as_deref().and_then(parse_number))
            .collect();
        self.satisfaction_median = median(&mut observed);
        self.is_fitted = true;

        debug!(
            satisfaction_median = ?self.satisfaction_median,
            observed = observed.len(),
            "Record cleaner fitted"
        );
        Ok(self)
    }

    /// Deduplicate and clean a batch. Inputs are never mutated.
    pub fn transform(&self, records: &[RawRecord]) -> Vec<CleanedRecord> {
        let unique = dedup(records);
        let dropped = records.len() - unique.len();
        if dropped > 0 {
            info!(dropped, remaining = unique.len(), "Dropped duplicate records");
        }
        unique.iter().map(|r| self.clean_record(r)).collect()
    }

    pub fn fit_transform(&mut self, records: &[RawRecord]) -> Result<Vec<CleanedRecord>> {
        self.fit(records)?;
        Ok(self.transform(records))
    }

    /// Clean a single record without deduplication
    pub fn clean_record(&self, raw: &RawRecord) -> CleanedRecord {
        let admission_date = raw.admission_date.as_deref().and_then(parse_date);
        let discharge_date = raw.discharge_date.as_deref().and_then(parse_date);
        if raw.admission_date.is_some() && admission_date.is_none() {
            debug!(value = ?raw.admission_date, "Unparseable admission date treated as missing");
        }
        if raw.discharge_date.is_some() && discharge_date.is_none() {
            debug!(value = ?raw.discharge_date, "Unparseable discharge date treated as missing");
        }

        let stay_length = Self::resolve_stay(
            raw.length_of_stay.as_deref(),
            admission_date,
            discharge_date,
        );

        let satisfaction = raw
            .satisfaction
            .as_deref()
            .and_then(parse_number)
            .or(self.satisfaction_median);

        CleanedRecord {
            patient_id: non_empty(raw.patient_id.as_deref()),
            age: raw.age.as_deref().and_then(parse_number),
            gender: non_empty(raw.gender.as_deref()),
            condition: non_empty(raw.condition.as_deref()),
            medication: non_empty(raw.medication.as_deref()),
            admission_date,
            discharge_date,
            stay_length,
            total_cost: raw.total_cost.as_deref().and_then(parse_number),
            outcome: non_empty(raw.outcome.as_deref()),
            satisfaction,
            insurance_claimed: raw.insurance_claimed.as_deref().and_then(parse_flag),
            readmission: non_empty(raw.readmission.as_deref()),
            age_group: None,
        }
    }

    /// Explicit length wins, then discharge minus admission in days, else missing.
    /// A negative date span is treated as missing.
    pub fn resolve_stay(
        explicit: Option<&str>,
        admission: Option<NaiveDate>,
        discharge: Option<NaiveDate>,
    ) -> Option<f64> {
        if let Some(days) = explicit.and_then(parse_number) {
            return Some(days);
        }
        match (admission, discharge) {
            (Some(start), Some(end)) => {
                let days = end.signed_duration_since(start).num_days();
                (days >= 0).then_some(days as f64)
            }
            _ => None,
        }
    }

    pub fn satisfaction_median(&self) -> Option<f64> {
        self.satisfaction_median
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocessing::RawField;

    #[test]
    fn test_parse_date_day_first() {
        let date = parse_date("03-04-2024").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 4, 3).unwrap());
        assert_eq!(
            parse_date("2025-01-06"),
            NaiveDate::from_ymd_opt(2025, 1, 6)
        );
        assert_eq!(
            parse_date("2025-01-06 10:30:00"),
            NaiveDate::from_ymd_opt(2025, 1, 6)
        );
        assert_eq!(parse_date("not a date"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn test_dedup_keeps_first_occurrence() {
        let a = RawRecord::new().with(RawField::PatientId, "1");
        let b = RawRecord::new().with(RawField::PatientId, "2");
        let unique = dedup(&[a.clone(), b.clone(), a.clone()]);
        assert_eq!(unique, vec![a, b]);
    }

    #[test]
    fn test_stay_priority() {
        let start = NaiveDate::from_ymd_opt(2025, 1, 1);
        let end = NaiveDate::from_ymd_opt(2025, 1, 6);

        assert_eq!(RecordCleaner::resolve_stay(Some("3"), start, end), Some(3.0));
        assert_eq!(RecordCleaner::resolve_stay(None, start, end), Some(5.0));
        assert_eq!(RecordCleaner::resolve_stay(Some("abc"), start, end), Some(5.0));
        assert_eq!(RecordCleaner::resolve_stay(None, start, None), None);
        assert_eq!(RecordCleaner::resolve_stay(None, end, start), None);
        assert_eq!(RecordCleaner::resolve_stay(None, None, None), None);
    }

    #[test]
    fn test_satisfaction_median_is_frozen() {
        let training = vec![
            RawRecord::new().with(RawField::Satisfaction, "2"),
            RawRecord::new().with(RawField::Satisfaction, "4"),
            RawRecord::new().with(RawField::Satisfaction, "5"),
            RawRecord::new().with(RawField::PatientId, "missing"),
        ];
        let mut cleaner = RecordCleaner::new();
        let cleaned = cleaner.fit_transform(&training).unwrap();
        assert_eq!(cleaner.satisfaction_median(), Some(4.0));
        assert_eq!(cleaned[3].satisfaction, Some(4.0));

        // A request with its own extreme value must not move the median
        let request = RawRecord::new().with(RawField::Satisfaction, "1");
        let _ = cleaner.transform(&[request]);
        assert_eq!(cleaner.satisfaction_median(), Some(4.0));

        let empty = RawRecord::new();
        assert_eq!(cleaner.clean_record(&empty).satisfaction, Some(4.0));
    }

    #[test]
    fn test_unfitted_cleaner_does_not_impute() {
        let cleaner = RecordCleaner::new();
        let cleaned = cleaner.clean_record(&RawRecord::new());
        assert_eq!(cleaned.satisfaction, None);
        assert_eq!(cleaned.stay_length, None);
    }

    #[test]
    fn test_soft_coercion() {
        let raw = RawRecord::new()
            .with(RawField::Age, " 45 ")
            .with(RawField::TotalCost, "lots")
            .with(RawField::Gender, "  Female ")
            .with(RawField::InsuranceClaimed, "Yes")
            .with(RawField::Condition, "   ");
        let cleaned = RecordCleaner::new().clean_record(&raw);
        assert_eq!(cleaned.age, Some(45.0));
        assert_eq!(cleaned.total_cost, None);
        assert_eq!(cleaned.gender.as_deref(), Some("Female"));
        assert_eq!(cleaned.insurance_claimed, Some(true));
        assert_eq!(cleaned.condition, None);
    }

    #[test]
    fn test_transform_does_not_mutate_input() {
        let records = vec![
            RawRecord::new().with(RawField::Age, "30"),
            RawRecord::new().with(RawField::Age, "30"),
        ];
        let snapshot = records.clone();
        let cleaned = RecordCleaner::new().transform(&records);
        assert_eq!(cleaned.len(), 1);
        assert_eq!(records, snapshot);
    }
}
