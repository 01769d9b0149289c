//! Trend classification.
//!
//! Groups a scan's ticks by base symbol and classifies each group from
//! its mean 24-hour change. Stateless: every scan starts from scratch.

use std::collections::BTreeMap;
use tracing::debug;

use crate::types::{Tick, TrendClass, TrendState};

/// Mean change above which a base symbol is bullish (below the negation: bearish).
const STRONG_MOVE_PCT: f64 = 3.0;

/// Mean change above which a base symbol is slightly bullish.
const MILD_MOVE_PCT: f64 = 1.0;

/// Mean change magnitude at which strength saturates.
const FULL_STRENGTH_PCT: f64 = 10.0;

/// Classify a mean 24h change. First match wins.
pub fn classify(avg_change: f64) -> TrendClass {
    if avg_change > STRONG_MOVE_PCT {
        TrendClass::Bullish
    } else if avg_change < -STRONG_MOVE_PCT {
        TrendClass::Bearish
    } else if avg_change > MILD_MOVE_PCT {
        TrendClass::SlightlyBullish
    } else if avg_change < -MILD_MOVE_PCT {
        TrendClass::SlightlyBearish
    } else {
        TrendClass::Neutral
    }
}

/// Trend strength in [0, 1], non-decreasing in `|avg_change|`.
pub fn strength(avg_change: f64) -> f64 {
    (avg_change.abs() / FULL_STRENGTH_PCT).min(1.0)
}

#[derive(Debug, Default)]
pub struct TrendAnalyzer;

impl TrendAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Produce one `TrendState` per base symbol present in `ticks`.
    pub fn analyze<'a, I>(&self, ticks: I) -> BTreeMap<String, TrendState>
    where
        I: IntoIterator<Item = &'a Tick>,
    {
        let mut groups: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
        for tick in ticks {
            let entry = groups.entry(tick.base_symbol()).or_insert((0.0, 0));
            entry.0 += tick.change_24h;
            entry.1 += 1;
        }

        groups
            .into_iter()
            .map(|(base, (sum, count))| {
                let avg_change = sum / count as f64;
                let state = TrendState {
                    classification: classify(avg_change),
                    strength: strength(avg_change),
                };
                debug!(
                    base,
                    avg_change = format!("{avg_change:+.2}%"),
                    trend = %state,
                    "Trend classified"
                );
                (base.to_string(), state)
            })
            .collect()
    }
}

/// Resolve a base symbol's trend, defaulting to neutral/0 when absent.
pub fn trend_for(trends: &BTreeMap<String, TrendState>, base: &str) -> TrendState {
    trends.get(base).copied().unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
