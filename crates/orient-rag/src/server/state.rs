//! Application state for the HTTP server

use std::sync::Arc;

use crate::config::RagConfig;
use crate::error::Result;
use crate::pipeline::RagPipeline;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: RagConfig,
    pipeline: RagPipeline,
}

impl AppState {
    /// Build the pipeline described by the configuration
    pub fn new(config: RagConfig) -> Result<Self> {
        tracing::info!("Initializing application state...");
        let pipeline = RagPipeline::from_config(&config)?;
        Ok(Self::with_pipeline(config, pipeline))
    }

    /// Wrap an already assembled pipeline
    pub fn with_pipeline(config: RagConfig, pipeline: RagPipeline) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, pipeline }),
        }
    }

    /// Get configuration
    pub fn config(&self) -> &RagConfig {
        &self.inner.config
    }

    /// Get the question answering pipeline
    pub fn pipeline(&self) -> &RagPipeline {
        &self.inner.pipeline
    }
}
