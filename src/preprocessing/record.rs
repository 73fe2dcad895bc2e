//! Patient record types flowing through the feature pipeline

use super::demographics::AgeBand;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Fields a raw patient record may carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RawField {
    PatientId,
    Age,
    Gender,
    Condition,
    Medication,
    LengthOfStay,
    AdmissionDate,
    DischargeDate,
    TotalCost,
    Outcome,
    Satisfaction,
    InsuranceClaimed,
    Readmission,
}

impl RawField {
    pub const ALL: [RawField; 13] = [
        RawField::PatientId,
        RawField::Age,
        RawField::Gender,
        RawField::Condition,
        RawField::Medication,
        RawField::LengthOfStay,
        RawField::AdmissionDate,
        RawField::DischargeDate,
        RawField::TotalCost,
        RawField::Outcome,
        RawField::Satisfaction,
        RawField::InsuranceClaimed,
        RawField::Readmission,
    ];

    /// Canonical column header in the historical dataset
    pub fn column_name(&self) -> &'static str {
        match self {
            RawField::PatientId => "Patient_ID",
            RawField::Age => "Age",
            RawField::Gender => "Gender",
            RawField::Condition => "Condition",
            RawField::Medication => "Medication",
            RawField::LengthOfStay => "Length_of_Stay",
            RawField::AdmissionDate => "Admission_Date",
            RawField::DischargeDate => "Discharge_Date",
            RawField::TotalCost => "Total_Cost",
            RawField::Outcome => "Outcome",
            RawField::Satisfaction => "Satisfaction",
            RawField::InsuranceClaimed => "Insurance_Claimed",
            RawField::Readmission => "Readmission",
        }
    }

    /// Resolve a column header, accepting the aliases seen in exports and forms.
    /// Surrounding whitespace is ignored.
    pub fn from_column_name(name: &str) -> Option<Self> {
        let name = name.trim();
        let field = match name {
            "Patient_ID" | "PatientID" => RawField::PatientId,
            "Age" => RawField::Age,
            "Gender" => RawField::Gender,
            "Condition" => RawField::Condition,
            "Medication" | "Treatment" => RawField::Medication,
            "Length_of_Stay" | "Stay_Length" => RawField::LengthOfStay,
            "Admission_Date" => RawField::AdmissionDate,
            "Discharge_Date" => RawField::DischargeDate,
            "Total_Cost" => RawField::TotalCost,
            "Outcome" => RawField::Outcome,
            "Satisfaction" | "Satisfaction_Rating" => RawField::Satisfaction,
            "Insurance_Claimed" => RawField::InsuranceClaimed,
            "Readmission" | "Readmission_Flag" | "ReadmissionFlag" => RawField::Readmission,
            _ => return None,
        };
        Some(field)
    }
}

/// A patient record exactly as read from a CSV row or request, before any coercion
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RawRecord {
    pub patient_id: Option<String>,
    pub age: Option<String>,
    pub gender: Option<String>,
    pub condition: Option<String>,
    pub medication: Option<String>,
    pub length_of_stay: Option<String>,
    pub admission_date: Option<String>,
    pub discharge_date: Option<String>,
    pub total_cost: Option<String>,
    pub outcome: Option<String>,
    pub satisfaction: Option<String>,
    pub insurance_claimed: Option<String>,
    pub readmission: Option<String>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: RawField) -> Option<&str> {
        self.slot(field).as_deref()
    }

    pub fn set(&mut self, field: RawField, value: Option<String>) {
        *self.slot_mut(field) = value;
    }

    /// Builder-style setter, mostly for fixtures
    pub fn with(mut self, field: RawField, value: impl Into<String>) -> Self {
        self.set(field, Some(value.into()));
        self
    }

    fn slot(&self, field: RawField) -> &Option<String> {
        match field {
            RawField::PatientId => &self.patient_id,
            RawField::Age => &self.age,
            RawField::Gender => &self.gender,
            RawField::Condition => &self.condition,
            RawField::Medication => &self.medication,
            RawField::LengthOfStay => &self.length_of_stay,
            RawField::AdmissionDate => &self.admission_date,
            RawField::DischargeDate => &self.discharge_date,
            RawField::TotalCost => &self.total_cost,
            RawField::Outcome => &self.outcome,
            RawField::Satisfaction => &self.satisfaction,
            RawField::InsuranceClaimed => &self.insurance_claimed,
            RawField::Readmission => &self.readmission,
        }
    }

    fn slot_mut(&mut self, field: RawField) -> &mut Option<String> {
        match field {
            RawField::PatientId => &mut self.patient_id,
            RawField::Age => &mut self.age,
            RawField::Gender => &mut self.gender,
            RawField::Condition => &mut self.condition,
            RawField::Medication => &mut self.medication,
            RawField::LengthOfStay => &mut self.length_of_stay,
            RawField::AdmissionDate => &mut self.admission_date,
            RawField::DischargeDate => &mut self.discharge_date,
            RawField::TotalCost => &mut self.total_cost,
            RawField::Outcome => &mut self.outcome,
            RawField::Satisfaction => &mut self.satisfaction,
            RawField::InsuranceClaimed => &mut self.insurance_claimed,
            RawField::Readmission => &mut self.readmission,
        }
    }
}

/// A record after cleaning and enrichment; every value is typed or missing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CleanedRecord {
    pub patient_id: Option<String>,
    pub age: Option<f64>,
    pub gender: Option<String>,
    pub condition: Option<String>,
    pub medication: Option<String>,
    pub admission_date: Option<NaiveDate>,
    pub discharge_date: Option<NaiveDate>,
    /// Reconciled stay duration in days
    pub stay_length: Option<f64>,
    pub total_cost: Option<f64>,
    pub outcome: Option<String>,
    pub satisfaction: Option<f64>,
    pub insurance_claimed: Option<bool>,
    pub readmission: Option<String>,
    pub age_group: Option<AgeBand>,
}

/// Nominal fields that can be one-hot encoded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CategoricalField {
    Gender,
    Condition,
    Medication,
    AgeGroup,
}

impl CategoricalField {
    pub fn column_name(&self) -> &'static str {
        match self {
            CategoricalField::Gender => "Gender",
            CategoricalField::Condition => "Condition",
            CategoricalField::Medication => "Medication",
            CategoricalField::AgeGroup => "Age_Group",
        }
    }

    pub fn value<'a>(&self, record: &'a CleanedRecord) -> Option<&'a str> {
        match self {
            CategoricalField::Gender => record.gender.as_deref(),
            CategoricalField::Condition => record.condition.as_deref(),
            CategoricalField::Medication => record.medication.as_deref(),
            CategoricalField::AgeGroup => record.age_group.map(|band| band.label()),
        }
    }
}

/// Numeric fields that can be scaled or passed through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NumericField {
    Age,
    StayLength,
    TotalCost,
    Satisfaction,
    InsuranceClaimed,
}

impl NumericField {
    pub fn column_name(&self) -> &'static str {
        match self {
            NumericField::Age => "Age",
            NumericField::StayLength => "Stay_Length",
            NumericField::TotalCost => "Total_Cost",
            NumericField::Satisfaction => "Satisfaction",
            NumericField::InsuranceClaimed => "Insurance_Claimed",
        }
    }

    pub fn value(&self, record: &CleanedRecord) -> Option<f64> {
        match self {
            NumericField::Age => record.age,
            NumericField::StayLength => record.stay_length,
            NumericField::TotalCost => record.total_cost,
            NumericField::Satisfaction => record.satisfaction,
            NumericField::InsuranceClaimed => {
                record.insurance_claimed.map(|flag| if flag { 1.0 } else { 0.0 })
            }
        }
    }
}
