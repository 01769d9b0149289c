//! Shared types for the MEMESCAN pipeline.
//!
//! These types form the data model passed between the tick store,
//! the strategy components and the scan scheduler. They carry no
//! behaviour beyond small helpers so every stage can depend on them
//! without circular references.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Tick
// ---------------------------------------------------------------------------

/// One exchange's snapshot of a trading pair at a point in time.
///
/// Ticks are produced by a [`MarketDataProvider`](crate::feeds::MarketDataProvider)
/// and never mutated by the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    /// Trading pair, e.g. "DOGE/USD".
    pub symbol: String,
    pub exchange: String,
    pub price: f64,
    pub bid: f64,
    pub ask: f64,
    pub volume_24h: f64,
    /// Signed 24-hour change in percent.
    pub change_24h: f64,
    pub timestamp_ms: i64,
}

impl Tick {
    /// The pair's left-hand asset ("DOGE" for "DOGE/USD").
    pub fn base_symbol(&self) -> &str {
        base_symbol(&self.symbol)
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} @ {} (bid {} / ask {} | 24h {:+.2}% | vol {:.0})",
            self.exchange,
            self.symbol,
            self.price,
            self.bid,
            self.ask,
            self.change_24h,
            self.volume_24h,
        )
    }
}

/// Extract the base asset of a pair. Symbols without a separator are
/// returned unchanged.
pub fn base_symbol(pair: &str) -> &str {
    pair.split('/').next().unwrap_or(pair)
}

// ---------------------------------------------------------------------------
// Trend
// ---------------------------------------------------------------------------

/// Five-level trend classification for a base symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendClass {
    Bullish,
    SlightlyBullish,
    Neutral,
    SlightlyBearish,
    Bearish,
}

impl fmt::Display for TrendClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrendClass::Bullish => write!(f, "bullish"),
            TrendClass::SlightlyBullish => write!(f, "slightly_bullish"),
            TrendClass::Neutral => write!(f, "neutral"),
            TrendClass::SlightlyBearish => write!(f, "slightly_bearish"),
            TrendClass::Bearish => write!(f, "bearish"),
        }
    }
}

/// Trend of one base symbol, recomputed from scratch every scan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendState {
    pub classification: TrendClass,
    /// 0.0–1.0
    pub strength: f64,
}

impl TrendState {
    /// State assumed for base symbols with no ticks this scan.
    pub const fn neutral() -> Self {
        Self {
            classification: TrendClass::Neutral,
            strength: 0.0,
        }
    }
}

impl Default for TrendState {
    fn default() -> Self {
        Self::neutral()
    }
}

impl fmt::Display for TrendState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.2})", self.classification, self.strength)
    }
}

// ---------------------------------------------------------------------------
// Prediction
// ---------------------------------------------------------------------------

/// Trade direction suggested by the ensemble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Buy,
    Sell,
    Hold,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Buy => write!(f, "BUY"),
            Direction::Sell => write!(f, "SELL"),
            Direction::Hold => write!(f, "HOLD"),
        }
    }
}

/// Ensemble prediction for one symbol, recreated every scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub symbol: String,
    pub direction: Direction,
    /// Final confidence after learned-model bonuses (0.0–0.95).
    pub confidence: f64,
    /// Confidence drawn by the direction policy, before bonuses.
    pub base_confidence: f64,
    /// 2–4 model names, in attribution order.
    pub contributing_models: Vec<String>,
    pub timestamp_ms: i64,
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} conf={:.1}% (base {:.1}%) models=[{}]",
            self.symbol,
            self.direction,
            self.confidence * 100.0,
            self.base_confidence * 100.0,
            self.contributing_models.join(", "),
        )
    }
}

// ---------------------------------------------------------------------------
// Opportunity
// ---------------------------------------------------------------------------

/// A cross-exchange spread that cleared both the confidence and the
/// profit threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opportunity {
    pub symbol: String,
    pub buy_exchange: String,
    pub sell_exchange: String,
    pub buy_price: f64,
    pub sell_price: f64,
    /// Copied from the originating prediction.
    pub confidence: f64,
    pub profit_potential_pct: f64,
    pub timestamp_ms: i64,
}

impl fmt::Display for Opportunity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: buy {} @ {} → sell {} @ {} | spread {:.2}% | conf {:.1}%",
            self.symbol,
            self.buy_exchange,
            self.buy_price,
            self.sell_exchange,
            self.sell_price,
            self.profit_potential_pct,
            self.confidence * 100.0,
        )
    }
}

// ---------------------------------------------------------------------------
// Model performance
// ---------------------------------------------------------------------------

/// One record from the model performance feed.
///
/// Accepts the learning tracker's export names (`name`, `learningProgress`,
/// `accuracy`) as aliases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelStat {
    #[serde(alias = "name")]
    pub model_name: String,
    /// 0–100
    #[serde(alias = "learningProgress", default)]
    pub learning_progress_pct: f64,
    /// 0–100
    #[serde(alias = "accuracy", default)]
    pub accuracy_pct: f64,
}

impl ModelStat {
    pub fn new(model_name: &str, learning_progress_pct: f64, accuracy_pct: f64) -> Self {
        Self {
            model_name: model_name.to_string(),
            learning_progress_pct,
            accuracy_pct,
        }
    }
}

// ---------------------------------------------------------------------------
// Scan report
// ---------------------------------------------------------------------------

/// How a scan pass ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanOutcome {
    /// Full pass; snapshots were replaced.
    Completed,
    /// Degenerate configuration (no symbols or exchanges); nothing touched.
    Skipped,
}

/// Provider health observed during one scan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataStatus {
    /// Exchanges that returned at least one tick.
    pub exchanges_reporting: Vec<String>,
    pub ticks_ingested: usize,
    pub failed_requests: usize,
}

/// Summary of one scan pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub scan_id: Uuid,
    pub scan_number: u64,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub outcome: ScanOutcome,
    pub data: DataStatus,
    pub trends: usize,
    pub predictions: usize,
    pub opportunities: usize,
}

impl fmt::Display for ScanReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Scan #{} ({:?}): ticks={} exchanges={} trends={} predictions={} opportunities={} in {}ms",
            self.scan_number,
            self.outcome,
            self.data.ticks_ingested,
            self.data.exchanges_reporting.len(),
            self.trends,
            self.predictions,
            self.opportunities,
            self.duration_ms,
        )
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Reasons a scan pass is aborted. None of these are fatal to the scheduler.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("Market data provider failed ({provider}): {message}")]
    Provider { provider: String, message: String },

    #[error("Scan exceeded its {timeout_ms}ms deadline")]
    Timeout { timeout_ms: u64 },

    #[error("Model performance feed error: {0}")]
    Feed(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
