//! Request handlers

use axum::{body::Bytes, extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use super::error::Result;
use super::state::AppState;
use crate::inference::PatientRequest;

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub readmission_prediction: u8,
    pub message: &'static str,
    pub probability: f64,
    pub defaults_applied: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub features_count: usize,
    pub schema_version: u32,
    pub schema_fingerprint: String,
    pub version: &'static str,
}

/// `POST /predict`. The body is read raw so that an empty body counts as an
/// empty request and malformed JSON is reported as `{ error }`.
pub async fn predict(State(state): State<Arc<AppState>>, body: Bytes) -> Result<Json<PredictResponse>> {
    let request = PatientRequest::from_json(&body)?;
    let prediction = state.adapter.predict(&request)?;

    Ok(Json(PredictResponse {
        readmission_prediction: prediction.label,
        message: prediction.message,
        probability: prediction.probability,
        defaults_applied: prediction.defaults_applied,
    }))
}

/// `GET /health`
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let schema = &state.artifact().schema;
    Json(HealthResponse {
        status: "ok",
        features_count: schema.len(),
        schema_version: schema.version(),
        schema_fingerprint: schema.fingerprint().to_string(),
        version: env!("CARGO_PKG_VERSION"),
    })
}
