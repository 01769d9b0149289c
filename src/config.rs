//! Configuration loading from TOML.
//!
//! Reads `config.toml` (or the file named by `MEMESCAN_CONFIG`) and
//! deserializes into strongly-typed structs. Every key has a default, so a
//! partial file is valid. Degenerate values (empty symbol/exchange sets, a
//! zero interval) load fine and produce no-op scans.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

/// Environment variable overriding the config file path.
pub const CONFIG_PATH_ENV: &str = "MEMESCAN_CONFIG";

const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Models known to the learning tracker.
const DEFAULT_MODEL_POOL: [&str; 12] = [
    "Linear Regression",
    "Moving Average",
    "Polynomial Regression",
    "RSI Momentum",
    "Bollinger Bands",
    "MACD Signal",
    "LSTM Neural Network",
    "Random Forest",
    "Gradient Boosting",
    "Transformer Model",
    "Ensemble Meta-Model",
    "Reinforcement Learning",
];

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub scanner: ScannerConfig,
    pub markets: MarketsConfig,
    pub provider: ProviderConfig,
    pub models: ModelsConfig,
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ScannerConfig {
    pub scan_interval_ms: u64,
    /// Deadline for one scan's data fetch.
    pub scan_timeout_ms: u64,
    /// Minimum prediction confidence for an opportunity, 0–100.
    pub confidence_threshold_pct: f64,
    /// Fixed seed for the prediction policy's random source.
    pub rng_seed: Option<u64>,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            scan_interval_ms: 5_000,
            scan_timeout_ms: 10_000,
            confidence_threshold_pct: 75.0,
            rng_seed: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MarketsConfig {
    pub enabled_symbols: Vec<String>,
    pub enabled_exchanges: Vec<String>,
}

impl Default for MarketsConfig {
    fn default() -> Self {
        Self {
            enabled_symbols: ["DOGE/USDT", "SHIB/USDT", "PEPE/USDT", "FLOKI/USDT"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            enabled_exchanges: ["binance", "coinbase", "kraken"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ProviderConfig {
    pub base_url: String,
    pub request_timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3001".to_string(),
            request_timeout_secs: 10,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ModelsConfig {
    pub pool: Vec<String>,
    /// Learning-tracker export. No file means no bonuses.
    pub performance_file: Option<PathBuf>,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            pool: DEFAULT_MODEL_POOL.iter().map(|s| s.to_string()).collect(),
            performance_file: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DashboardConfig {
    pub enabled: bool,
    pub port: u16,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: 8080,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        Self::parse(&contents).with_context(|| format!("Failed to parse config file: {path}"))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents).context("Invalid TOML configuration")?;
        Ok(config)
    }

    /// Path from `MEMESCAN_CONFIG`, else `config.toml`.
    pub fn default_path() -> String {
        std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string())
    }
}
