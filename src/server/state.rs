//! Application state management

use crate::export::ModelArtifact;
use crate::inference::InferenceAdapter;
use chrono::{DateTime, Utc};
use std::sync::Arc;

use super::ServerConfig;

/// Application state shared across handlers. Built once at startup from a
/// loaded artifact and never mutated.
#[derive(Debug)]
pub struct AppState {
    pub config: ServerConfig,
    pub adapter: InferenceAdapter,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(config: ServerConfig, adapter: InferenceAdapter) -> Self {
        Self {
            config,
            adapter,
            started_at: Utc::now(),
        }
    }

    pub fn artifact(&self) -> &ModelArtifact {
        self.adapter.artifact()
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}
