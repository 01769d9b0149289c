//! Ensemble prediction synthesis.
//!
//! Blends the scan's 24h change, the symbol's price momentum and its
//! base-asset trend into a direction and base confidence, attributes the
//! call to a random subset of known models, and lifts the confidence by
//! those models' learned bonuses.
//!
//! The direction policy is stochastic, emulating ensemble disagreement.
//! Every random draw goes through the caller's `Rng` so tests can pin it.

use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeMap;
use std::ops::Range;
use tracing::debug;

use super::bonus::ConfidenceBonusRegistry;
use super::trend::trend_for;
use crate::engine::tick_store::TickStore;
use crate::types::{base_symbol, Direction, Prediction, TrendClass, TrendState};

/// Hard ceiling on any prediction's confidence.
pub const MAX_CONFIDENCE: f64 = 0.95;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Tunables of the direction and attribution policy.
#[derive(Debug, Clone)]
pub struct PredictionConfig {
    /// |avg 24h change| that, with agreeing momentum, counts as a trend.
    pub change_trigger_pct: f64,
    /// Probability of acting on a trending signal (else hold).
    pub trend_follow_prob: f64,
    /// Probability of holding in a sideways market.
    pub sideways_hold_prob: f64,
    /// Base confidence band for trending signals.
    pub trending_band: Range<f64>,
    /// Base confidence band for sideways holds.
    pub sideways_hold_band: Range<f64>,
    /// Base confidence band for sideways buy/sell calls.
    pub sideways_trade_band: Range<f64>,
    pub min_models: usize,
    pub max_models: usize,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            change_trigger_pct: 2.0,
            trend_follow_prob: 0.8,
            sideways_hold_prob: 0.6,
            trending_band: 0.70..0.95,
            sideways_hold_band: 0.60..0.80,
            sideways_trade_band: 0.60..0.75,
            min_models: 2,
            max_models: 4,
        }
    }
}

/// Market regime resolved for one symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Regime {
    Uptrend,
    Downtrend,
    Sideways,
}

/// Inputs the direction policy sees for one symbol.
#[derive(Debug, Clone, Copy)]
pub struct SignalInputs {
    pub avg_change_24h: f64,
    pub momentum_pct: f64,
    pub trend: TrendState,
}

// ---------------------------------------------------------------------------
// Synthesizer
// ---------------------------------------------------------------------------

pub struct PredictionSynthesizer {
    config: PredictionConfig,
    model_pool: Vec<String>,
}

impl PredictionSynthesizer {
    pub fn new(config: PredictionConfig, model_pool: Vec<String>) -> Self {
        Self { config, model_pool }
    }

    /// Classify the regime. Bullish/bearish trends win outright; otherwise
    /// a strong 24h change must agree with the history's momentum.
    pub fn regime(&self, inputs: &SignalInputs) -> Regime {
        let trigger = self.config.change_trigger_pct;
        if inputs.trend.classification == TrendClass::Bullish
            || (inputs.avg_change_24h > trigger && inputs.momentum_pct > 0.0)
        {
            Regime::Uptrend
        } else if inputs.trend.classification == TrendClass::Bearish
            || (inputs.avg_change_24h < -trigger && inputs.momentum_pct < 0.0)
        {
            Regime::Downtrend
        } else {
            Regime::Sideways
        }
    }

    /// Draw a direction and base confidence for a regime.
    ///
    /// Returns the lower edge of the band used, which is also the floor
    /// for the bonus-adjusted confidence.
    pub fn decide<R: Rng + ?Sized>(&self, regime: Regime, rng: &mut R) -> (Direction, f64, f64) {
        let cfg = &self.config;
        match regime {
            Regime::Uptrend | Regime::Downtrend => {
                let act = if regime == Regime::Uptrend {
                    Direction::Buy
                } else {
                    Direction::Sell
                };
                let direction = if rng.gen_bool(cfg.trend_follow_prob) {
                    act
                } else {
                    Direction::Hold
                };
                let base = rng.gen_range(cfg.trending_band.clone());
                (direction, base, cfg.trending_band.start)
            }
            Regime::Sideways => {
                let roll: f64 = rng.gen();
                if roll < cfg.sideways_hold_prob {
                    let base = rng.gen_range(cfg.sideways_hold_band.clone());
                    (Direction::Hold, base, cfg.sideways_hold_band.start)
                } else {
                    // Remaining mass split evenly between buy and sell
                    let split = cfg.sideways_hold_prob + (1.0 - cfg.sideways_hold_prob) / 2.0;
                    let direction = if roll < split {
                        Direction::Buy
                    } else {
                        Direction::Sell
                    };
                    let base = rng.gen_range(cfg.sideways_trade_band.clone());
                    (direction, base, cfg.sideways_trade_band.start)
                }
            }
        }
    }

    /// Pick 2–4 distinct models from the pool.
    pub fn select_models<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<String> {
        let mut pool = self.model_pool.clone();
        pool.shuffle(rng);
        let count = rng.gen_range(self.config.min_models..=self.config.max_models);
        pool.truncate(count.min(pool.len()));
        pool
    }

    /// Apply the contributing models' average bonus.
    ///
    /// Without any non-zero bonus the base confidence passes through.
    pub fn apply_bonus(
        base: f64,
        floor: f64,
        models: &[String],
        bonuses: &ConfidenceBonusRegistry,
    ) -> f64 {
        match bonuses.average_for(models) {
            Some(avg) => (base + avg).min(MAX_CONFIDENCE).max(floor.min(MAX_CONFIDENCE)),
            None => base,
        }
    }

    /// Predict every symbol that has ticks this scan and at least two
    /// history points. Others are skipped silently.
    pub fn synthesize<R: Rng + ?Sized>(
        &self,
        store: &TickStore,
        trends: &BTreeMap<String, TrendState>,
        bonuses: &ConfidenceBonusRegistry,
        rng: &mut R,
        now_ms: i64,
    ) -> Vec<Prediction> {
        if self.model_pool.len() < self.config.min_models {
            debug!(
                known = self.model_pool.len(),
                required = self.config.min_models,
                "Too few known models, skipping prediction"
            );
            return Vec::new();
        }

        let mut predictions = Vec::new();

        for symbol in store.symbols() {
            let ticks = store.latest_ticks_for(symbol);
            if ticks.is_empty() {
                continue;
            }
            let Some(history) = store.history(symbol).filter(|h| h.len() >= 2) else {
                debug!(symbol, "Not enough price history, skipping");
                continue;
            };

            let n = ticks.len() as f64;
            let avg_price = ticks.iter().map(|t| t.price).sum::<f64>() / n;
            let avg_change = ticks.iter().map(|t| t.change_24h).sum::<f64>() / n;

            let inputs = SignalInputs {
                avg_change_24h: avg_change,
                momentum_pct: history.momentum_pct(),
                trend: trend_for(trends, base_symbol(symbol)),
            };
            let regime = self.regime(&inputs);
            let (direction, base_confidence, floor) = self.decide(regime, rng);
            let models = self.select_models(rng);
            let confidence = Self::apply_bonus(base_confidence, floor, &models, bonuses);

            debug!(
                symbol,
                avg_price,
                avg_change = format!("{avg_change:+.2}%"),
                momentum = format!("{:+.2}%", inputs.momentum_pct),
                trend = %inputs.trend,
                regime = ?regime,
                direction = %direction,
                base = format!("{:.1}%", base_confidence * 100.0),
                confidence = format!("{:.1}%", confidence * 100.0),
                "Prediction synthesized"
            );

            predictions.push(Prediction {
                symbol: symbol.to_string(),
                direction,
                confidence,
                base_confidence,
                contributing_models: models,
                timestamp_ms: now_ms,
            });
        }

        predictions
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
