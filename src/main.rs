//! MEMESCAN: cross-exchange market signal and arbitrage opportunity scanner
//!
//! Entry point. Loads configuration, initialises structured logging, wires
//! the market data provider and model performance feed into the scan
//! pipeline, and runs the scan scheduler until Ctrl+C.

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use memescan::config::AppConfig;
use memescan::dashboard::{self, DashboardState};
use memescan::engine::{PipelineConfig, ScanPipeline, ScanScheduler, SignalBoard};
use memescan::feeds::http::HttpMarketData;
use memescan::feeds::performance::JsonFileFeed;

const BANNER: &str = r#"
 __  __ _____ __  __ _____ ____   ____    _    _   _
|  \/  | ____|  \/  | ____/ ___| / ___|  / \  | \ | |
| |\/| |  _| | |\/| |  _| \___ \| |     / _ \ |  \| |
| |  | | |___| |  | | |___ ___) | |___ / ___ \| |\  |
|_|  |_|_____|_|  |_|_____|____/ \____/_/   \_\_| \_|

  Cross-exchange signal & arbitrage scanner v0.1.0
"#;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let config_path = AppConfig::default_path();
    let cfg = AppConfig::load(&config_path)?;

    init_logging();

    println!("{BANNER}");
    info!(
        config = %config_path,
        scan_interval_ms = cfg.scanner.scan_interval_ms,
        confidence_threshold_pct = cfg.scanner.confidence_threshold_pct,
        symbols = cfg.markets.enabled_symbols.len(),
        exchanges = cfg.markets.enabled_exchanges.len(),
        "MEMESCAN starting up"
    );

    // -- Initialise components -------------------------------------------

    let provider = Arc::new(HttpMarketData::new(
        &cfg.provider.base_url,
        Duration::from_secs(cfg.provider.request_timeout_secs),
    )?);
    info!(base_url = %cfg.provider.base_url, "Using exchange ticker backend");

    let board = Arc::new(SignalBoard::new());
    let mut pipeline = ScanPipeline::new(PipelineConfig::from(cfg.clone()), provider, board.clone());

    match &cfg.models.performance_file {
        Some(path) => {
            info!(path = %path.display(), "Using model performance export");
            pipeline = pipeline.with_feed(Arc::new(JsonFileFeed::new(path)));
        }
        None => warn!("No model performance feed configured, confidence bonuses disabled"),
    }

    let scheduler = ScanScheduler::new(
        pipeline,
        Duration::from_millis(cfg.scanner.scan_interval_ms),
    );

    let _dashboard = if cfg.dashboard.enabled {
        let state = Arc::new(DashboardState::new(board.clone(), scheduler.clone()));
        Some(dashboard::spawn_dashboard(state, cfg.dashboard.port).await?)
    } else {
        None
    };

    // -- Main loop -------------------------------------------------------

    let handle = scheduler.start();
    info!("Scanning. Press Ctrl+C to stop.");

    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl+C, shutting down");
    }

    info!("Shutdown signal received, waiting for in-flight scan");
    handle.stop().await;

    if let Some(report) = board.last_report().await {
        info!(%report, "Last scan");
    }
    info!("MEMESCAN stopped");
    Ok(())
}

/// Initialise `tracing` with env-filter support.
///
/// Set `RUST_LOG=memescan=debug` for verbose output, or
/// `MEMESCAN_LOG_JSON=1` for JSON-formatted logs.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("memescan=info"));

    let json_logging = std::env::var("MEMESCAN_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
