//! Tick store.
//!
//! Holds the current scan's ticks (one per exchange and symbol) and a
//! bounded price history per symbol. History is the only state that
//! survives between scans.

use std::collections::{BTreeMap, HashMap, VecDeque};
use tracing::debug;

use crate::types::Tick;

/// Maximum number of prices retained per symbol.
pub const HISTORY_CAPACITY: usize = 20;

// ---------------------------------------------------------------------------
// Price history
// ---------------------------------------------------------------------------

/// Ring buffer of the most recent prices for one symbol, oldest first.
#[derive(Debug, Clone, Default)]
pub struct PriceHistory {
    prices: VecDeque<f64>,
}

impl PriceHistory {
    pub fn new() -> Self {
        Self {
            prices: VecDeque::with_capacity(HISTORY_CAPACITY),
        }
    }

    /// Append a price, evicting the oldest one when full.
    pub fn push(&mut self, price: f64) {
        if self.prices.len() == HISTORY_CAPACITY {
            self.prices.pop_front();
        }
        self.prices.push_back(price);
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    pub fn first(&self) -> Option<f64> {
        self.prices.front().copied()
    }

    pub fn last(&self) -> Option<f64> {
        self.prices.back().copied()
    }

    pub fn to_vec(&self) -> Vec<f64> {
        self.prices.iter().copied().collect()
    }

    /// Percentage move from the oldest to the newest price.
    /// Zero with fewer than two points or a non-positive first price.
    pub fn momentum_pct(&self) -> f64 {
        match (self.first(), self.last()) {
            (Some(first), Some(last)) if self.prices.len() >= 2 && first > 0.0 => {
                (last - first) / first * 100.0
            }
            _ => 0.0,
        }
    }
}

impl FromIterator<f64> for PriceHistory {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut history = PriceHistory::new();
        for price in iter {
            history.push(price);
        }
        history
    }
}

// ---------------------------------------------------------------------------
// Tick store
// ---------------------------------------------------------------------------

/// Current-scan ticks plus per-symbol price history.
#[derive(Debug, Default)]
pub struct TickStore {
    /// symbol → exchange → tick. Ordered so downstream output is stable.
    current: BTreeMap<String, BTreeMap<String, Tick>>,
    history: HashMap<String, PriceHistory>,
}

impl TickStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current scan's tick set and extend history.
    ///
    /// Duplicate `(exchange, symbol)` ticks collapse to the one with the
    /// latest timestamp (later input wins ties). Each symbol then appends
    /// the price of its most recent tick to its history.
    pub fn ingest(&mut self, ticks: Vec<Tick>) {
        let mut current: BTreeMap<String, BTreeMap<String, Tick>> = BTreeMap::new();

        for tick in ticks {
            let by_exchange = current.entry(tick.symbol.clone()).or_default();
            match by_exchange.get(&tick.exchange) {
                Some(existing) if existing.timestamp_ms > tick.timestamp_ms => {
                    debug!(
                        symbol = %tick.symbol,
                        exchange = %tick.exchange,
                        "Dropping stale duplicate tick"
                    );
                }
                _ => {
                    by_exchange.insert(tick.exchange.clone(), tick);
                }
            }
        }

        for (symbol, by_exchange) in &current {
            let latest = by_exchange.values().max_by_key(|t| t.timestamp_ms);
            if let Some(latest) = latest {
                self.history
                    .entry(symbol.clone())
                    .or_insert_with(PriceHistory::new)
                    .push(latest.price);
            }
        }

        self.current = current;
    }

    /// Ordered price history for a symbol (0–20 entries).
    pub fn history_of(&self, symbol: &str) -> Vec<f64> {
        self.history
            .get(symbol)
            .map(PriceHistory::to_vec)
            .unwrap_or_default()
    }

    pub fn history(&self, symbol: &str) -> Option<&PriceHistory> {
        self.history.get(symbol)
    }

    /// This scan's ticks for a symbol, one per exchange, ordered by exchange id.
    pub fn latest_ticks_for(&self, symbol: &str) -> Vec<&Tick> {
        self.current
            .get(symbol)
            .map(|by_exchange| by_exchange.values().collect())
            .unwrap_or_default()
    }

    /// Every tick of the current scan.
    pub fn current_ticks(&self) -> impl Iterator<Item = &Tick> {
        self.current.values().flat_map(|by_exchange| by_exchange.values())
    }

    /// Symbols with at least one tick this scan.
    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.current.keys().map(String::as_str)
    }

    pub fn tick_count(&self) -> usize {
        self.current.values().map(BTreeMap::len).sum()
    }

    /// Seed a symbol's history directly (backfills and tests).
    pub fn seed_history(&mut self, symbol: &str, prices: &[f64]) {
        let history = self.history.entry(symbol.to_string()).or_default();
        for &price in prices {
            history.push(price);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
