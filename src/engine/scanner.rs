//! Tick scanner.
//!
//! Fans one `get_tick` request out per enabled `(exchange, symbol)` pair,
//! concurrently, and collects whatever comes back. Absent and failed pairs
//! are tolerated individually; the caller decides whether the scan as a
//! whole is usable.

use futures::future::join_all;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::feeds::MarketDataProvider;
use crate::types::{DataStatus, Tick};

/// What one fan-out produced.
#[derive(Debug, Default)]
pub struct FetchOutcome {
    pub ticks: Vec<Tick>,
    pub status: DataStatus,
    /// One message per failed request, `exchange symbol: error`.
    pub errors: Vec<String>,
}

impl FetchOutcome {
    /// No tick at all and at least one failed request.
    pub fn is_total_outage(&self) -> bool {
        self.ticks.is_empty() && !self.errors.is_empty()
    }
}

pub struct TickScanner {
    provider: Arc<dyn MarketDataProvider>,
}

impl TickScanner {
    pub fn new(provider: Arc<dyn MarketDataProvider>) -> Self {
        Self { provider }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Fetch every `(exchange, symbol)` pair concurrently.
    ///
    /// Ticks come back in exchange-major request order. A tick whose
    /// exchange or symbol does not match the request is relabelled.
    pub async fn fetch(&self, exchanges: &[String], symbols: &[String]) -> FetchOutcome {
        let requests = exchanges
            .iter()
            .flat_map(|ex| symbols.iter().map(move |sym| (ex.as_str(), sym.as_str())));

        let responses = join_all(requests.map(|(exchange, symbol)| async move {
            (exchange, symbol, self.provider.get_tick(exchange, symbol).await)
        }))
        .await;

        let mut outcome = FetchOutcome::default();
        let mut reporting = BTreeSet::new();

        for (exchange, symbol, response) in responses {
            match response {
                Ok(Some(mut tick)) => {
                    tick.exchange = exchange.to_string();
                    tick.symbol = symbol.to_string();
                    reporting.insert(exchange.to_string());
                    outcome.ticks.push(tick);
                }
                Ok(None) => {
                    debug!(exchange, symbol, "No data this scan");
                }
                Err(e) => {
                    warn!(
                        provider = self.provider.name(),
                        exchange,
                        symbol,
                        error = %format!("{e:#}"),
                        "Tick request failed"
                    );
                    outcome.errors.push(format!("{exchange} {symbol}: {e:#}"));
                }
            }
        }

        outcome.status = DataStatus {
            exchanges_reporting: reporting.into_iter().collect(),
            ticks_ingested: outcome.ticks.len(),
            failed_requests: outcome.errors.len(),
        };

        info!(
            ticks = outcome.status.ticks_ingested,
            exchanges = outcome.status.exchanges_reporting.len(),
            failed = outcome.status.failed_requests,
            "Tick fan-out complete"
        );

        outcome
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
