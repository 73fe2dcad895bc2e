//! Demographic enrichment

use super::record::CleanedRecord;
use serde::{Deserialize, Serialize};

/// Age band derived from the numeric age
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgeBand {
    Child,
    Adult,
    MiddleAged,
    Senior,
}

impl AgeBand {
    pub const ALL: [AgeBand; 4] = [
        AgeBand::Child,
        AgeBand::Adult,
        AgeBand::MiddleAged,
        AgeBand::Senior,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            AgeBand::Child => "Child",
            AgeBand::Adult => "Adult",
            AgeBand::MiddleAged => "Middle-aged",
            AgeBand::Senior => "Senior",
        }
    }
}

/// Cut points of the right-inclusive bins `(0,18] (18,40] (40,60] (60,100]`
pub const AGE_CUT_POINTS: [f64; 5] = [0.0, 18.0, 40.0, 60.0, 100.0];

/// Derives categorical buckets from numeric fields
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct DemographicsEnricher;

impl DemographicsEnricher {
    pub fn new() -> Self {
        Self
    }

    /// Map an age to its band. Ages outside `[0, 100]` are clamped into the
    /// first or last band; non-finite ages have no band.
    pub fn age_band(age: f64) -> Option<AgeBand> {
        if !age.is_finite() {
            return None;
        }
        let age = age.clamp(AGE_CUT_POINTS[0], AGE_CUT_POINTS[4]);
        let band = if age <= AGE_CUT_POINTS[1] {
            AgeBand::Child
        } else if age <= AGE_CUT_POINTS[2] {
            AgeBand::Adult
        } else if age <= AGE_CUT_POINTS[3] {
            AgeBand::MiddleAged
        } else {
            AgeBand::Senior
        };
        Some(band)
    }

    pub fn enrich(&self, record: &mut CleanedRecord) {
        record.age_group = record.age.and_then(Self::age_band);
    }

    pub fn enrich_all(&self, records: &mut [CleanedRecord]) {
        for record in records.iter_mut() {
            self.enrich(record);
        }
    }
}
