//! Cross-exchange arbitrage detection.
//!
//! Turns confident buy predictions into opportunities by pairing the
//! cheapest and dearest exchange quoting the symbol this scan, then ranks
//! the survivors.

use std::cmp::Ordering;
use tracing::debug;

use crate::engine::tick_store::TickStore;
use crate::types::{Direction, Opportunity, Prediction};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct OpportunityConfig {
    /// Minimum prediction confidence (0.0–1.0) to consider a symbol.
    pub confidence_threshold: f64,
    /// Confidence above which the relaxed profit floor applies.
    pub high_confidence_cutoff: f64,
    /// Profit floor (percent) for high-confidence predictions.
    pub high_confidence_min_profit_pct: f64,
    /// Profit floor (percent) otherwise.
    pub min_profit_pct: f64,
    /// Confidence gap beyond which confidence alone decides ranking.
    pub ranking_confidence_margin: f64,
}

impl Default for OpportunityConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.75,
            high_confidence_cutoff: 0.85,
            high_confidence_min_profit_pct: 0.3,
            min_profit_pct: 0.5,
            ranking_confidence_margin: 0.10,
        }
    }
}

impl OpportunityConfig {
    /// Build from a 0–100 threshold percentage, clamping out-of-range input.
    pub fn with_threshold_pct(threshold_pct: f64) -> Self {
        Self {
            confidence_threshold: threshold_pct.clamp(0.0, 100.0) / 100.0,
            ..Self::default()
        }
    }

    /// Profit floor for a given prediction confidence.
    pub fn min_profit_threshold_pct(&self, confidence: f64) -> f64 {
        if confidence > self.high_confidence_cutoff {
            self.high_confidence_min_profit_pct
        } else {
            self.min_profit_pct
        }
    }
}

// ---------------------------------------------------------------------------
// Detector
// ---------------------------------------------------------------------------

pub struct OpportunityDetector {
    config: OpportunityConfig,
}

impl OpportunityDetector {
    pub fn new(config: OpportunityConfig) -> Self {
        Self { config }
    }

    /// Find and rank all opportunities for this scan.
    pub fn detect(
        &self,
        predictions: &[Prediction],
        store: &TickStore,
        now_ms: i64,
    ) -> Vec<Opportunity> {
        let mut opportunities: Vec<Opportunity> = predictions
            .iter()
            .filter(|p| {
                p.direction == Direction::Buy && p.confidence >= self.config.confidence_threshold
            })
            .filter_map(|p| self.evaluate(p, store, now_ms))
            .collect();

        self.rank(&mut opportunities);
        opportunities
    }

    /// Evaluate one buy prediction against this scan's quotes.
    fn evaluate(&self, prediction: &Prediction, store: &TickStore, now_ms: i64) -> Option<Opportunity> {
        let ticks = store.latest_ticks_for(&prediction.symbol);
        if ticks.len() < 2 {
            debug!(symbol = %prediction.symbol, exchanges = ticks.len(), "Need two exchanges for arbitrage");
            return None;
        }

        let buy = ticks.iter().copied().min_by(|a, b| a.price.total_cmp(&b.price))?;
        let sell = ticks.iter().copied().max_by(|a, b| a.price.total_cmp(&b.price))?;
        if buy.price <= 0.0 {
            return None;
        }

        let profit_pct = (sell.price - buy.price) / buy.price * 100.0;
        let min_profit = self.config.min_profit_threshold_pct(prediction.confidence);

        if profit_pct <= min_profit {
            debug!(
                symbol = %prediction.symbol,
                spread = format!("{profit_pct:.3}%"),
                min_profit = format!("{min_profit}%"),
                "Spread below profit floor"
            );
            return None;
        }

        debug!(
            symbol = %prediction.symbol,
            buy_exchange = %buy.exchange,
            sell_exchange = %sell.exchange,
            spread = format!("{profit_pct:.3}%"),
            confidence = format!("{:.1}%", prediction.confidence * 100.0),
            min_profit = format!("{min_profit}%"),
            "Opportunity detected"
        );

        Some(Opportunity {
            symbol: prediction.symbol.clone(),
            buy_exchange: buy.exchange.clone(),
            sell_exchange: sell.exchange.clone(),
            buy_price: buy.price,
            sell_price: sell.price,
            confidence: prediction.confidence,
            profit_potential_pct: profit_pct,
            timestamp_ms: now_ms,
        })
    }

    /// Ranking comparator: confidence decides only when the gap exceeds the
    /// margin, otherwise the larger spread goes first.
    pub fn compare(&self, a: &Opportunity, b: &Opportunity) -> Ordering {
        let confidence_gap = b.confidence - a.confidence;
        if confidence_gap.abs() > self.config.ranking_confidence_margin {
            return confidence_gap.total_cmp(&0.0);
        }
        b.profit_potential_pct.total_cmp(&a.profit_potential_pct)
    }

    /// Sort best-first. The comparator is not transitive, which library
    /// sorts may reject, so this is a stable insertion sort.
    pub fn rank(&self, opportunities: &mut [Opportunity]) {
        for i in 1..opportunities.len() {
            let mut j = i;
            while j > 0 && self.compare(&opportunities[j], &opportunities[j - 1]) == Ordering::Less {
                opportunities.swap(j, j - 1);
                j -= 1;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
