//! One scan pass: fetch → ingest → trends → bonuses → predictions →
//! opportunities → publish.
//!
//! The pipeline owns all cross-scan state (price history, bonus registry,
//! random source) so nothing else mutates it. Errors abort the pass before
//! the tick store or the board is touched.

use chrono::Utc;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{timeout_at, Instant};
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use super::board::SignalBoard;
use super::scanner::TickScanner;
use super::tick_store::TickStore;
use crate::config::AppConfig;
use crate::feeds::{MarketDataProvider, ModelPerformanceFeed};
use crate::strategy::opportunity::{OpportunityConfig, OpportunityDetector};
use crate::strategy::prediction::{PredictionConfig, PredictionSynthesizer};
use crate::strategy::StrategyOrchestrator;
use crate::types::{DataStatus, ModelStat, ScanError, ScanOutcome, ScanReport};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub symbols: Vec<String>,
    pub exchanges: Vec<String>,
    /// Deadline for the data fetch of one pass.
    pub scan_timeout: Duration,
    pub confidence_threshold_pct: f64,
    pub model_pool: Vec<String>,
    pub rng_seed: Option<u64>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        AppConfig::default().into()
    }
}

impl From<AppConfig> for PipelineConfig {
    fn from(cfg: AppConfig) -> Self {
        Self {
            symbols: cfg.markets.enabled_symbols,
            exchanges: cfg.markets.enabled_exchanges,
            scan_timeout: Duration::from_millis(cfg.scanner.scan_timeout_ms),
            confidence_threshold_pct: cfg.scanner.confidence_threshold_pct,
            model_pool: cfg.models.pool,
            rng_seed: cfg.scanner.rng_seed,
        }
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

pub struct ScanPipeline {
    scanner: TickScanner,
    feed: Option<Arc<dyn ModelPerformanceFeed>>,
    store: TickStore,
    strategy: StrategyOrchestrator,
    rng: Box<dyn RngCore + Send>,
    symbols: Vec<String>,
    exchanges: Vec<String>,
    scan_timeout: Duration,
    board: Arc<SignalBoard>,
    scans_run: u64,
}

impl ScanPipeline {
    pub fn new(
        config: PipelineConfig,
        provider: Arc<dyn MarketDataProvider>,
        board: Arc<SignalBoard>,
    ) -> Self {
        let rng: Box<dyn RngCore + Send> = match config.rng_seed {
            Some(seed) => Box::new(StdRng::seed_from_u64(seed)),
            None => Box::new(StdRng::from_entropy()),
        };
        let strategy = StrategyOrchestrator::new(
            PredictionSynthesizer::new(PredictionConfig::default(), config.model_pool),
            OpportunityDetector::new(OpportunityConfig::with_threshold_pct(
                config.confidence_threshold_pct,
            )),
        );

        Self {
            scanner: TickScanner::new(provider),
            feed: None,
            store: TickStore::new(),
            strategy,
            rng,
            symbols: config.symbols,
            exchanges: config.exchanges,
            scan_timeout: config.scan_timeout,
            board,
            scans_run: 0,
        }
    }

    /// Attach a model performance feed. Without one no bonuses apply.
    pub fn with_feed(mut self, feed: Arc<dyn ModelPerformanceFeed>) -> Self {
        self.feed = Some(feed);
        self
    }

    /// Replace the random source driving the prediction policy.
    pub fn with_rng(mut self, rng: Box<dyn RngCore + Send>) -> Self {
        self.rng = rng;
        self
    }

    pub fn store(&self) -> &TickStore {
        &self.store
    }

    /// Run one full pass and publish its output.
    ///
    /// On error the tick store, history and board keep their previous
    /// contents.
    pub async fn run_scan(&mut self) -> Result<ScanReport, ScanError> {
        self.scans_run += 1;
        let scan_id = Uuid::new_v4();
        let scan_number = self.scans_run;
        let span = info_span!("scan", %scan_id, scan_number);
        self.scan(scan_id, scan_number).instrument(span).await
    }

    async fn scan(&mut self, scan_id: Uuid, scan_number: u64) -> Result<ScanReport, ScanError> {
        let started_at = Utc::now();
        let clock = Instant::now();

        if self.symbols.is_empty() || self.exchanges.is_empty() {
            let err = ScanError::Config("no enabled symbols or exchanges".to_string());
            warn!(error = %err, "Nothing to scan");
            let report = ScanReport {
                scan_id,
                scan_number,
                started_at,
                duration_ms: 0,
                outcome: ScanOutcome::Skipped,
                data: DataStatus::default(),
                trends: 0,
                predictions: 0,
                opportunities: 0,
            };
            self.board.record_report(report.clone()).await;
            return Ok(report);
        }

        let deadline = clock + self.scan_timeout;

        // 1. Market data
        let fetched = timeout_at(deadline, self.scanner.fetch(&self.exchanges, &self.symbols))
            .await
            .map_err(|_| ScanError::Timeout {
                timeout_ms: self.scan_timeout.as_millis() as u64,
            })?;

        if fetched.is_total_outage() {
            return Err(ScanError::Provider {
                provider: self.scanner.provider_name().to_string(),
                message: format!(
                    "all {} failed request(s), first: {}",
                    fetched.errors.len(),
                    fetched.errors[0]
                ),
            });
        }

        // 2. Learned-model performance
        let stats = fetch_model_stats(self.feed.as_ref(), deadline).await;

        // 3. Strategy pass
        let status = fetched.status;
        self.store.ingest(fetched.ticks);
        let signals = self.strategy.run(
            &self.store,
            stats.as_deref(),
            &mut *self.rng,
            Utc::now().timestamp_millis(),
        );

        let report = ScanReport {
            scan_id,
            scan_number,
            started_at,
            duration_ms: clock.elapsed().as_millis() as u64,
            outcome: ScanOutcome::Completed,
            data: status,
            trends: signals.trends.len(),
            predictions: signals.predictions.len(),
            opportunities: signals.opportunities.len(),
        };

        for opp in &signals.opportunities {
            info!(
                symbol = %opp.symbol,
                buy = %opp.buy_exchange,
                sell = %opp.sell_exchange,
                spread = format!("{:.2}%", opp.profit_potential_pct),
                confidence = format!("{:.1}%", opp.confidence * 100.0),
                "Arbitrage opportunity"
            );
        }

        self.board.publish(signals, report.clone()).await;
        info!(%report, "Scan complete");
        Ok(report)
    }
}

/// `None` when there is no feed or it failed; both mean zero bonuses.
async fn fetch_model_stats(
    feed: Option<&Arc<dyn ModelPerformanceFeed>>,
    deadline: Instant,
) -> Option<Vec<ModelStat>> {
    let feed = feed?;
    match timeout_at(deadline, feed.fetch_stats()).await {
        Ok(Ok(stats)) => Some(stats),
        Ok(Err(e)) => {
            let err = ScanError::Feed(format!("{e:#}"));
            warn!(error = %err, "Continuing without confidence bonuses");
            None
        }
        Err(_) => {
            let err = ScanError::Feed("deadline exceeded".to_string());
            warn!(error = %err, "Continuing without confidence bonuses");
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
