//! Mock market data provider for integration testing.
//!
//! Serves scripted ticks per `(exchange, symbol)`, can fail individual
//! exchanges or everything, and can delay each response to hold a scan
//! in flight. Tracks call counts and peak concurrency.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use memescan::feeds::MarketDataProvider;
use memescan::types::Tick;

#[derive(Clone, Default)]
pub struct MockProvider {
    /// (exchange, symbol) → (price, change_24h)
    quotes: Arc<Mutex<HashMap<(String, String), (f64, f64)>>>,
    failing_exchanges: Arc<Mutex<HashSet<String>>>,
    /// If set, every request returns this error.
    force_error: Arc<Mutex<Option<String>>>,
    delay: Arc<Mutex<Duration>>,
    calls: Arc<AtomicUsize>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
    clock: Arc<AtomicI64>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn quote(&self, exchange: &str, symbol: &str, price: f64, change_24h: f64) {
        self.quotes
            .lock()
            .unwrap()
            .insert((exchange.to_string(), symbol.to_string()), (price, change_24h));
    }

    pub fn fail_exchange(&self, exchange: &str) {
        self.failing_exchanges
            .lock()
            .unwrap()
            .insert(exchange.to_string());
    }

    /// Force all subsequent requests to return an error.
    pub fn set_error(&self, msg: &str) {
        *self.force_error.lock().unwrap() = Some(msg.to_string());
    }

    /// Clear any forced error.
    pub fn clear_error(&self) {
        *self.force_error.lock().unwrap() = None;
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = delay;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MarketDataProvider for MockProvider {
    async fn get_tick(&self, exchange: &str, symbol: &str) -> Result<Option<Tick>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let delay = *self.delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if let Some(msg) = self.force_error.lock().unwrap().clone() {
            return Err(anyhow!(msg));
        }
        if self.failing_exchanges.lock().unwrap().contains(exchange) {
            return Err(anyhow!("{exchange} unreachable"));
        }

        let quote = self
            .quotes
            .lock()
            .unwrap()
            .get(&(exchange.to_string(), symbol.to_string()))
            .copied();

        Ok(quote.map(|(price, change_24h)| Tick {
            symbol: symbol.to_string(),
            exchange: exchange.to_string(),
            price,
            bid: price * 0.999,
            ask: price * 1.001,
            volume_24h: 1_000_000.0,
            change_24h,
            timestamp_ms: self.clock.fetch_add(1, Ordering::SeqCst),
        }))
    }

    fn name(&self) -> &str {
        "mock"
    }
}
