//! Readmission risk prediction server
//!
//! Loads the model artifact once at startup, then serves `POST /predict` and
//! `GET /health`. A missing or inconsistent artifact stops startup before the
//! listener is bound.

mod api;
mod error;
mod state;
mod handlers;

pub use api::create_router;
pub use error::ServerError;
pub use handlers::{HealthResponse, PredictResponse};
pub use state::AppState;

use crate::error::{ReadmitError, Result};
use crate::inference::{InferenceAdapter, InferenceStrategy};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub model_path: PathBuf,
    pub strategy: InferenceStrategy,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: std::env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            model_path: std::env::var("MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("models/readmission_model.json")),
            strategy: InferenceStrategy::PipelineReplay,
        }
    }
}

impl ServerConfig {
    pub fn with_model_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.model_path = path.into();
        self
    }

    pub fn with_strategy(mut self, strategy: InferenceStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| ReadmitError::ConfigError(format!("invalid address {}:{}: {}", self.host, self.port, e)))
    }
}

/// Load the artifact and build the shared state. Any failure is a
/// [`ReadmitError::StartupError`].
pub fn build_state(config: ServerConfig) -> Result<Arc<AppState>> {
    let adapter = InferenceAdapter::load(&config.model_path, config.strategy).map_err(|e| match e {
        ReadmitError::StartupError(_) => e,
        other => ReadmitError::StartupError(other.to_string()),
    })?;
    Ok(AppState::new(config, adapter).shared())
}

/// Start the server with the given configuration
pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    let addr = config.socket_addr()?;
    let state = build_state(config)?;
    let start_time = state.started_at;

    info!(
        model_path = %state.config.model_path.display(),
        features = state.artifact().schema.len(),
        schema_fingerprint = state.artifact().schema.fingerprint(),
        strategy = ?state.config.strategy,
        "Model artifact loaded"
    );

    let app = create_router(Arc::clone(&state));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(address = %addr, pid = std::process::id(), "Server listening and ready to accept connections");

    let shutdown_signal = async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for ctrl+c; shutting down");
        }
        let stop_time = chrono::Utc::now();
        let uptime = stop_time.signed_duration_since(start_time);
        info!(
            stopped_at = %stop_time.to_rfc3339(),
            uptime_secs = uptime.num_seconds(),
            "Shutdown signal received, stopping server gracefully"
        );
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Server shut down cleanly");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builders() {
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 3000,
            model_path: PathBuf::from("models/readmission_model.json"),
            strategy: InferenceStrategy::PipelineReplay,
        }
        .with_model_path("/tmp/model.json")
        .with_strategy(InferenceStrategy::DirectSynthesis);

        assert_eq!(config.model_path, PathBuf::from("/tmp/model.json"));
        assert_eq!(config.strategy, InferenceStrategy::DirectSynthesis);
        assert_eq!(config.socket_addr().unwrap().port(), 3000);
    }

    #[test]
    fn test_missing_artifact_is_startup_error() {
        let config = ServerConfig::default().with_model_path("/nonexistent/readmission_model.json");
        assert!(matches!(build_state(config), Err(ReadmitError::StartupError(_))));
    }
}
