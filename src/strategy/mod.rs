//! Signal strategy: trend classification, learned-model bonuses,
//! ensemble predictions and arbitrage detection.

pub mod bonus;
pub mod opportunity;
pub mod prediction;
pub mod trend;

use rand::Rng;
use std::collections::BTreeMap;
use tracing::info;

use crate::engine::tick_store::TickStore;
use crate::types::{ModelStat, Opportunity, Prediction, TrendState};
use bonus::ConfidenceBonusRegistry;
use opportunity::OpportunityDetector;
use prediction::PredictionSynthesizer;
use trend::TrendAnalyzer;

// ---------------------------------------------------------------------------
// Signal set
// ---------------------------------------------------------------------------

/// Everything one strategy pass produces. Replaced wholesale every scan.
#[derive(Debug, Clone, Default)]
pub struct SignalSet {
    pub trends: BTreeMap<String, TrendState>,
    pub predictions: Vec<Prediction>,
    pub opportunities: Vec<Opportunity>,
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

/// Pipelines trend analysis → bonus refresh → prediction → detection.
///
/// The bonus registry is an explicit value owned here and refreshed from
/// the performance feed's records at the start of each pass.
pub struct StrategyOrchestrator {
    trends: TrendAnalyzer,
    bonuses: ConfidenceBonusRegistry,
    synthesizer: PredictionSynthesizer,
    detector: OpportunityDetector,
}

impl StrategyOrchestrator {
    pub fn new(synthesizer: PredictionSynthesizer, detector: OpportunityDetector) -> Self {
        Self {
            trends: TrendAnalyzer::new(),
            bonuses: ConfidenceBonusRegistry::new(),
            synthesizer,
            detector,
        }
    }

    pub fn bonuses(&self) -> &ConfidenceBonusRegistry {
        &self.bonuses
    }

    /// Run one strategy pass over an already-ingested tick store.
    ///
    /// `model_stats` of `None` means the performance feed is absent, which
    /// leaves every model without a bonus.
    pub fn run<R: Rng + ?Sized>(
        &mut self,
        store: &TickStore,
        model_stats: Option<&[ModelStat]>,
        rng: &mut R,
        now_ms: i64,
    ) -> SignalSet {
        let trends = self.trends.analyze(store.current_ticks());

        match model_stats {
            Some(stats) => self.bonuses.refresh(stats),
            None => self.bonuses.clear(),
        }

        let predictions = self
            .synthesizer
            .synthesize(store, &trends, &self.bonuses, rng, now_ms);
        let opportunities = self.detector.detect(&predictions, store, now_ms);

        info!(
            trends = trends.len(),
            predictions = predictions.len(),
            opportunities = opportunities.len(),
            bonused_models = self.bonuses.len(),
            "Strategy pass complete"
        );

        SignalSet {
            trends,
            predictions,
            opportunities,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
