//! Exchange ticker backend over HTTP.
//!
//! Endpoint: `GET {base_url}/api/exchange/ticker/{exchange}/{BASE-QUOTE}`
//! Returns a camelCase ticker object. 404 means the exchange is not
//! connected or does not list the pair.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::MarketDataProvider;
use crate::types::Tick;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

const PROVIDER_NAME: &str = "exchange-http";

/// Spread assumed around `price` when the backend omits bid/ask.
const DEFAULT_HALF_SPREAD: f64 = 0.001;

// ---------------------------------------------------------------------------
// API response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TickerResponse {
    #[serde(default)]
    price: Option<f64>,
    #[serde(default)]
    bid: Option<f64>,
    #[serde(default)]
    ask: Option<f64>,
    #[serde(default)]
    volume24h: Option<f64>,
    #[serde(default)]
    change24h: Option<f64>,
    /// ms since epoch
    #[serde(default)]
    timestamp: Option<i64>,
}

/// Positive, finite value or `None`.
fn positive(v: Option<f64>) -> Option<f64> {
    v.filter(|x| x.is_finite() && *x > 0.0)
}

impl TickerResponse {
    /// Map to a `Tick`. No usable price means no data.
    fn into_tick(self, exchange: &str, symbol: &str, now_ms: i64) -> Option<Tick> {
        let price = positive(self.price)?;
        Some(Tick {
            symbol: symbol.to_string(),
            exchange: exchange.to_string(),
            price,
            bid: positive(self.bid).unwrap_or(price * (1.0 - DEFAULT_HALF_SPREAD)),
            ask: positive(self.ask).unwrap_or(price * (1.0 + DEFAULT_HALF_SPREAD)),
            volume_24h: self.volume24h.filter(|v| v.is_finite()).unwrap_or(0.0),
            change_24h: self.change24h.filter(|v| v.is_finite()).unwrap_or(0.0),
            timestamp_ms: self.timestamp.unwrap_or(now_ms),
        })
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct HttpMarketData {
    http: Client,
    base_url: String,
}

impl HttpMarketData {
    pub fn new(base_url: &str, request_timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(request_timeout)
            .user_agent("MEMESCAN/0.1.0 (market-scanner)")
            .build()
            .context("Failed to build HTTP client for exchange ticker backend")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// `DOGE/USDT` on binance → `{base}/api/exchange/ticker/binance/DOGE-USDT`
    fn ticker_url(&self, exchange: &str, symbol: &str) -> String {
        format!(
            "{}/api/exchange/ticker/{}/{}",
            self.base_url,
            urlencoding::encode(exchange),
            urlencoding::encode(&symbol.replace('/', "-")),
        )
    }
}

#[async_trait]
impl MarketDataProvider for HttpMarketData {
    async fn get_tick(&self, exchange: &str, symbol: &str) -> Result<Option<Tick>> {
        let url = self.ticker_url(exchange, symbol);
        debug!(url = %url, "Fetching ticker");

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Ticker request failed for {symbol} on {exchange}"))?;

        if resp.status() == StatusCode::NOT_FOUND {
            debug!(exchange, symbol, "Pair not available on exchange");
            return Ok(None);
        }
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Ticker API error {status} for {symbol} on {exchange}: {body}");
        }

        let ticker: TickerResponse = resp
            .json()
            .await
            .with_context(|| format!("Failed to parse ticker for {symbol} on {exchange}"))?;

        Ok(ticker.into_tick(exchange, symbol, Utc::now().timestamp_millis()))
    }

    fn name(&self) -> &str {
        PROVIDER_NAME
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
