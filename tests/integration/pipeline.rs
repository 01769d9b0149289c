//! End-to-end scan passes against the mock provider.

use rand::rngs::mock::StepRng;
use std::sync::Arc;
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};

use memescan::engine::tick_store::HISTORY_CAPACITY;
use memescan::engine::{PipelineConfig, ScanPipeline, SignalBoard};
use memescan::feeds::performance::{JsonFileFeed, StaticFeed};
use memescan::strategy::prediction::MAX_CONFIDENCE;
use memescan::types::{Direction, ModelStat, ScanError, ScanOutcome};

use crate::mock_provider::MockProvider;

const EXCHANGES: [&str; 3] = ["binance", "coinbase", "kraken"];

fn config(symbols: &[&str]) -> PipelineConfig {
    PipelineConfig {
        symbols: symbols.iter().map(|s| s.to_string()).collect(),
        exchanges: EXCHANGES.iter().map(|s| s.to_string()).collect(),
        scan_timeout: Duration::from_secs(2),
        rng_seed: Some(2024),
        ..PipelineConfig::default()
    }
}

fn trained_feed() -> Arc<StaticFeed> {
    let pool = PipelineConfig::default().model_pool;
    Arc::new(StaticFeed::new(
        pool.iter().map(|m| ModelStat::new(m, 100.0, 100.0)).collect(),
    ))
}

/// PEPE quoted 1.25% apart on binance/kraken, rallying 6%.
fn pepe_spread(provider: &MockProvider) {
    provider.quote("binance", "PEPE/USDT", 0.0000080, 6.0);
    provider.quote("kraken", "PEPE/USDT", 0.0000081, 6.0);
}

#[tokio::test]
async fn test_opportunity_detected_with_trained_models() {
    let provider = MockProvider::new();
    pepe_spread(&provider);
    let board = Arc::new(SignalBoard::new());
    let mut pipeline = ScanPipeline::new(config(&["PEPE/USDT"]), Arc::new(provider), board.clone())
        .with_feed(trained_feed())
        .with_rng(Box::new(StepRng::new(0, 0)));

    // History needs two points before predictions start
    let first = assert_ok!(pipeline.run_scan().await);
    assert_eq!(first.predictions, 0);
    let second = assert_ok!(pipeline.run_scan().await);
    assert_eq!(second.predictions, 1);
    assert_eq!(second.opportunities, 1);

    let prediction = &board.predictions().await[0];
    assert_eq!(prediction.direction, Direction::Buy);
    assert!((prediction.confidence - MAX_CONFIDENCE).abs() < 1e-12);

    let opp = &board.opportunities().await[0];
    assert_eq!(opp.symbol, "PEPE/USDT");
    assert_eq!(opp.buy_exchange, "binance");
    assert_eq!(opp.sell_exchange, "kraken");
    assert!(opp.buy_price <= opp.sell_price);
    assert!((opp.profit_potential_pct - 1.25).abs() < 1e-9);
    assert_eq!(opp.confidence, prediction.confidence);
}

#[tokio::test]
async fn test_no_feed_means_base_confidence_everywhere() {
    let provider = MockProvider::new();
    pepe_spread(&provider);
    provider.quote("binance", "DOGE/USDT", 0.12, 5.0);
    provider.quote("coinbase", "DOGE/USDT", 0.1201, 4.0);
    provider.quote("kraken", "SHIB/USDT", 0.00002, -0.5);

    let board = Arc::new(SignalBoard::new());
    let mut pipeline = ScanPipeline::new(
        config(&["PEPE/USDT", "DOGE/USDT", "SHIB/USDT"]),
        Arc::new(provider),
        board.clone(),
    );

    assert_ok!(pipeline.run_scan().await);
    for _ in 0..10 {
        assert_ok!(pipeline.run_scan().await);
        let predictions = board.predictions().await;
        assert_eq!(predictions.len(), 3);
        for p in predictions {
            assert_eq!(p.confidence, p.base_confidence);
            assert!(p.confidence <= MAX_CONFIDENCE);
        }
    }
}

#[tokio::test]
async fn test_history_stays_bounded_across_scans() {
    let provider = MockProvider::new();
    let board = Arc::new(SignalBoard::new());
    let mut pipeline = ScanPipeline::new(
        config(&["FLOKI/USDT"]),
        Arc::new(provider.clone()),
        board,
    );

    for i in 0..30 {
        provider.quote("binance", "FLOKI/USDT", 0.0001 + i as f64 * 1e-6, 0.0);
        assert_ok!(pipeline.run_scan().await);
        assert!(pipeline.store().history_of("FLOKI/USDT").len() <= HISTORY_CAPACITY);
    }
    let history = pipeline.store().history_of("FLOKI/USDT");
    assert_eq!(history.len(), HISTORY_CAPACITY);
    assert!((history[0] - (0.0001 + 10.0 * 1e-6)).abs() < 1e-15);
    assert!((history[HISTORY_CAPACITY - 1] - (0.0001 + 29.0 * 1e-6)).abs() < 1e-15);
}

#[tokio::test]
async fn test_partial_outage_still_completes() {
    let provider = MockProvider::new();
    pepe_spread(&provider);
    provider.quote("coinbase", "PEPE/USDT", 0.0000082, 6.0);
    provider.fail_exchange("coinbase");

    let board = Arc::new(SignalBoard::new());
    let mut pipeline = ScanPipeline::new(config(&["PEPE/USDT"]), Arc::new(provider), board);

    let report = assert_ok!(pipeline.run_scan().await);
    assert_eq!(report.outcome, ScanOutcome::Completed);
    assert_eq!(report.data.failed_requests, 1);
    assert_eq!(report.data.ticks_ingested, 2);
    assert_eq!(report.data.exchanges_reporting, vec!["binance", "kraken"]);
}

#[tokio::test]
async fn test_provider_failure_keeps_last_good_snapshots() {
    let provider = MockProvider::new();
    pepe_spread(&provider);
    let board = Arc::new(SignalBoard::new());
    let mut pipeline = ScanPipeline::new(
        config(&["PEPE/USDT"]),
        Arc::new(provider.clone()),
        board.clone(),
    )
    .with_feed(trained_feed())
    .with_rng(Box::new(StepRng::new(0, 0)));

    assert_ok!(pipeline.run_scan().await);
    let good = assert_ok!(pipeline.run_scan().await);
    let predictions = board.predictions().await;
    let opportunities = board.opportunities().await;
    assert!(!opportunities.is_empty());

    provider.set_error("exchange backend down");
    let err = assert_err!(pipeline.run_scan().await);
    assert!(matches!(err, ScanError::Provider { .. }));

    assert_eq!(board.predictions().await, predictions);
    assert_eq!(board.opportunities().await, opportunities);
    assert_eq!(board.last_report().await.unwrap().scan_id, good.scan_id);
    assert_eq!(pipeline.store().history_of("PEPE/USDT").len(), 2);

    // Next scan recovers
    provider.clear_error();
    let report = assert_ok!(pipeline.run_scan().await);
    assert_eq!(report.scan_number, 4);
    assert_eq!(pipeline.store().history_of("PEPE/USDT").len(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_slow_provider_hits_scan_deadline() {
    let provider = MockProvider::new();
    pepe_spread(&provider);
    provider.set_delay(Duration::from_secs(30));

    let board = Arc::new(SignalBoard::new());
    let mut pipeline = ScanPipeline::new(config(&["PEPE/USDT"]), Arc::new(provider), board.clone());

    let err = assert_err!(pipeline.run_scan().await);
    assert!(matches!(err, ScanError::Timeout { timeout_ms: 2000 }));
    assert!(board.last_report().await.is_none());
    assert!(pipeline.store().history_of("PEPE/USDT").is_empty());
}

#[tokio::test]
async fn test_single_exchange_symbol_has_no_opportunity() {
    let provider = MockProvider::new();
    provider.quote("kraken", "BONK/USDT", 0.00003, 8.0);
    let board = Arc::new(SignalBoard::new());
    let mut pipeline = ScanPipeline::new(config(&["BONK/USDT"]), Arc::new(provider), board.clone())
        .with_feed(trained_feed())
        .with_rng(Box::new(StepRng::new(0, 0)));

    assert_ok!(pipeline.run_scan().await);
    let report = assert_ok!(pipeline.run_scan().await);
    assert_eq!(report.predictions, 1);
    assert_eq!(report.opportunities, 0);
}

#[tokio::test]
async fn test_json_performance_file_feeds_bonuses() {
    let path = std::env::temp_dir().join(format!("memescan-it-{}.json", uuid::Uuid::new_v4()));
    let models: Vec<serde_json::Value> = PipelineConfig::default()
        .model_pool
        .iter()
        .map(|m| serde_json::json!({ "name": m, "learningProgress": 100, "accuracy": 100 }))
        .collect();
    tokio::fs::write(&path, serde_json::json!({ "models": models }).to_string())
        .await
        .unwrap();

    let provider = MockProvider::new();
    pepe_spread(&provider);
    let board = Arc::new(SignalBoard::new());
    let mut pipeline = ScanPipeline::new(config(&["PEPE/USDT"]), Arc::new(provider), board.clone())
        .with_feed(Arc::new(JsonFileFeed::new(&path)))
        .with_rng(Box::new(StepRng::new(0, 0)));

    assert_ok!(pipeline.run_scan().await);
    assert_ok!(pipeline.run_scan().await);
    let p = &board.predictions().await[0];
    assert!(p.confidence > p.base_confidence);

    tokio::fs::remove_file(&path).await.unwrap();
}
