//! External collaborators the scan pipeline consumes.
//!
//! Defines the `MarketDataProvider` and `ModelPerformanceFeed` traits and
//! provides implementations for:
//! - the exchange ticker HTTP backend (`http`)
//! - the learning-tracker JSON export and fixed in-memory stats (`performance`)

pub mod http;
pub mod performance;

use anyhow::Result;
use async_trait::async_trait;

use crate::types::{ModelStat, Tick};

/// Source of per-exchange ticks.
///
/// `Ok(None)` means the exchange has no data for the pair this scan and is
/// not an error. `Err` is a failed request; the pipeline treats one failed
/// pair as absence and only aborts when every request of a scan fails.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    async fn get_tick(&self, exchange: &str, symbol: &str) -> Result<Option<Tick>>;

    /// Provider name for logging and error reports.
    fn name(&self) -> &str;
}

/// Source of learned-model performance records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ModelPerformanceFeed: Send + Sync {
    async fn fetch_stats(&self) -> Result<Vec<ModelStat>>;
}
