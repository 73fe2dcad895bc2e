//! Prediction request: loose JSON fields coerced into a typed patient input

use crate::error::{ReadmitError, Result};
use crate::preprocessing::cleaner::{parse_date, parse_flag};
use crate::preprocessing::{RawField, RawRecord, RecordCleaner};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

pub const DEFAULT_AGE: f64 = 50.0;
pub const DEFAULT_GENDER: &str = "Male";
pub const DEFAULT_CONDITION: &str = "Heart Disease";
pub const DEFAULT_TREATMENT: &str = "Angioplasty";
pub const DEFAULT_TOTAL_COST: f64 = 10000.0;

/// A partial patient description. Every field is optional and may be a
/// string or a number.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatientRequest {
    #[serde(rename = "Age", default, skip_serializing_if = "Option::is_none")]
    pub age: Option<Value>,
    #[serde(rename = "Gender", default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Value>,
    #[serde(rename = "Condition", default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Value>,
    #[serde(rename = "Treatment", alias = "Medication", default, skip_serializing_if = "Option::is_none")]
    pub treatment: Option<Value>,
    #[serde(rename = "Stay_Length", alias = "Length_of_Stay", default, skip_serializing_if = "Option::is_none")]
    pub stay_length: Option<Value>,
    #[serde(rename = "Total_Cost", default, skip_serializing_if = "Option::is_none")]
    pub total_cost: Option<Value>,
    #[serde(rename = "Admission_Date", default, skip_serializing_if = "Option::is_none")]
    pub admission_date: Option<Value>,
    #[serde(rename = "Discharge_Date", default, skip_serializing_if = "Option::is_none")]
    pub discharge_date: Option<Value>,
    #[serde(rename = "Satisfaction", alias = "Satisfaction_Rating", default, skip_serializing_if = "Option::is_none")]
    pub satisfaction: Option<Value>,
    #[serde(rename = "Insurance_Claimed", default, skip_serializing_if = "Option::is_none")]
    pub insurance_claimed: Option<Value>,
}

/// Typed input after coercion and defaulting
#[derive(Debug, Clone, PartialEq)]
pub struct PatientInput {
    pub age: f64,
    pub gender: String,
    pub condition: String,
    pub treatment: String,
    pub stay_length: Option<f64>,
    pub total_cost: f64,
    pub admission_date: Option<NaiveDate>,
    pub discharge_date: Option<NaiveDate>,
    /// `None` means the frozen training median applies
    pub satisfaction: Option<f64>,
    /// `None` encodes as 0
    pub insurance_claimed: Option<bool>,
    /// Request fields that were filled with a documented default
    pub defaults_applied: Vec<String>,
}

fn input_error(field: &str, value: &Value, expected: &str) -> ReadmitError {
    ReadmitError::InputError(format!("{} must be {}, got {}", field, expected, value))
}

fn coerce_number(field: &str, value: Option<&Value>) -> Result<Option<f64>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_f64()
            .filter(|v| v.is_finite())
            .map(Some)
            .ok_or_else(|| input_error(field, &Value::Number(n.clone()), "a finite number")),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(v @ Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(Some)
            .ok_or_else(|| input_error(field, v, "a number")),
        Some(v) => Err(input_error(field, v, "a number")),
    }
}

fn coerce_text(field: &str, value: Option<&Value>) -> Result<Option<String>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => {
            let s = s.trim();
            Ok((!s.is_empty()).then(|| s.to_string()))
        }
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(v) => Err(input_error(field, v, "a string")),
    }
}

fn coerce_date(field: &str, value: Option<&Value>) -> Result<Option<NaiveDate>> {
    match coerce_text(field, value)? {
        None => Ok(None),
        Some(text) => {
            let date = parse_date(&text);
            if date.is_none() {
                debug!(field, value = %text, "Unparseable request date treated as missing");
            }
            Ok(date)
        }
    }
}

fn coerce_flag(field: &str, value: Option<&Value>) -> Result<Option<bool>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(v @ Value::Number(n)) => match n.as_f64() {
            Some(x) if x == 1.0 => Ok(Some(true)),
            Some(x) if x == 0.0 => Ok(Some(false)),
            _ => Err(input_error(field, v, "0 or 1")),
        },
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(v @ Value::String(s)) => parse_flag(s)
            .map(Some)
            .ok_or_else(|| input_error(field, v, "yes/no")),
        Some(v) => Err(input_error(field, v, "yes/no")),
    }
}

impl PatientRequest {
    /// Parse a JSON body; an empty body is an empty request
    pub fn from_json(body: &[u8]) -> Result<Self> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(body).map_err(|e| ReadmitError::InputError(format!("malformed JSON body: {}", e)))
    }

    /// Coerce every field and apply the documented defaults
    pub fn resolve(&self) -> Result<PatientInput> {
        let mut defaults_applied = Vec::new();
        let mut defaulted = |name: &str| defaults_applied.push(name.to_string());

        let age = match coerce_number("Age", self.age.as_ref())? {
            Some(age) => age,
            None => {
                defaulted("Age");
                DEFAULT_AGE
            }
        };
        let gender = coerce_text("Gender", self.gender.as_ref())?.unwrap_or_else(|| {
            defaulted("Gender");
            DEFAULT_GENDER.to_string()
        });
        let condition = coerce_text("Condition", self.condition.as_ref())?.unwrap_or_else(|| {
            defaulted("Condition");
            DEFAULT_CONDITION.to_string()
        });
        let treatment = coerce_text("Treatment", self.treatment.as_ref())?.unwrap_or_else(|| {
            defaulted("Treatment");
            DEFAULT_TREATMENT.to_string()
        });
        let total_cost = match coerce_number("Total_Cost", self.total_cost.as_ref())? {
            Some(cost) => cost,
            None => {
                defaulted("Total_Cost");
                DEFAULT_TOTAL_COST
            }
        };

        let satisfaction = coerce_number("Satisfaction", self.satisfaction.as_ref())?;
        if satisfaction.is_none() {
            defaulted("Satisfaction");
        }
        let insurance_claimed = coerce_flag("Insurance_Claimed", self.insurance_claimed.as_ref())?;
        if insurance_claimed.is_none() {
            defaulted("Insurance_Claimed");
        }

        Ok(PatientInput {
            age,
            gender,
            condition,
            treatment,
            stay_length: coerce_number("Stay_Length", self.stay_length.as_ref())?,
            total_cost,
            admission_date: coerce_date("Admission_Date", self.admission_date.as_ref())?,
            discharge_date: coerce_date("Discharge_Date", self.discharge_date.as_ref())?,
            satisfaction,
            insurance_claimed,
            defaults_applied,
        })
    }
}

impl PatientInput {
    /// Stay length as the cleaner would reconcile it
    pub fn resolved_stay(&self) -> Option<f64> {
        self.stay_length
            .or_else(|| RecordCleaner::resolve_stay(None, self.admission_date, self.discharge_date))
    }

    /// Raw record equivalent, for replay through the fitted pipeline
    pub fn to_raw_record(&self) -> RawRecord {
        let mut record = RawRecord::new()
            .with(RawField::Age, self.age.to_string())
            .with(RawField::Gender, self.gender.as_str())
            .with(RawField::Condition, self.condition.as_str())
            .with(RawField::Medication, self.treatment.as_str())
            .with(RawField::TotalCost, self.total_cost.to_string());
        if let Some(stay) = self.stay_length {
            record = record.with(RawField::LengthOfStay, stay.to_string());
        }
        if let Some(date) = self.admission_date {
            record = record.with(RawField::AdmissionDate, date.format("%Y-%m-%d").to_string());
        }
        if let Some(date) = self.discharge_date {
            record = record.with(RawField::DischargeDate, date.format("%Y-%m-%d").to_string());
        }
        if let Some(satisfaction) = self.satisfaction {
            record = record.with(RawField::Satisfaction, satisfaction.to_string());
        }
        if let Some(flag) = self.insurance_claimed {
            record = record.with(RawField::InsuranceClaimed, if flag { "Yes" } else { "No" });
        }
        record
    }
}
