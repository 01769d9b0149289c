//! Model performance feeds.
//!
//! `JsonFileFeed` reads the learning-tracker export:
//!
//! ```json
//! { "models": [ { "name": "LSTM Neural Network", "learningProgress": 82.5, "accuracy": 71.0 } ] }
//! ```
//!
//! `StaticFeed` serves a fixed list.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::PathBuf;
use tracing::debug;

use super::ModelPerformanceFeed;
use crate::types::ModelStat;

#[derive(Debug, Deserialize)]
struct PerformanceExport {
    #[serde(default)]
    models: Vec<ModelStat>,
}

/// Parse a learning-tracker export.
pub fn parse_export(raw: &str) -> Result<Vec<ModelStat>> {
    let export: PerformanceExport =
        serde_json::from_str(raw).context("Failed to parse model performance export")?;
    Ok(export.models)
}

/// Re-reads a JSON export on every fetch. A missing file yields no stats.
pub struct JsonFileFeed {
    path: PathBuf,
}

impl JsonFileFeed {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ModelPerformanceFeed for JsonFileFeed {
    async fn fetch_stats(&self) -> Result<Vec<ModelStat>> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No model performance export yet");
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to read model performance file {}", self.path.display())
                })
            }
        };

        let stats = parse_export(&raw)
            .with_context(|| format!("Invalid model performance file {}", self.path.display()))?;
        debug!(path = %self.path.display(), models = stats.len(), "Model performance loaded");
        Ok(stats)
    }
}

#[derive(Debug, Clone, Default)]
pub struct StaticFeed {
    stats: Vec<ModelStat>,
}

impl StaticFeed {
    pub fn new(stats: Vec<ModelStat>) -> Self {
        Self { stats }
    }
}

#[async_trait]
impl ModelPerformanceFeed for StaticFeed {
    async fn fetch_stats(&self) -> Result<Vec<ModelStat>> {
        Ok(self.stats.clone())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
