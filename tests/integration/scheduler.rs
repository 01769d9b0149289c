//! Timer-driven scheduling with a paused clock.

use std::sync::Arc;
use std::time::Duration;

use memescan::engine::{PipelineConfig, ScanPipeline, ScanScheduler, SignalBoard, TriggerOutcome};

use crate::mock_provider::MockProvider;

/// One pair per scan, so provider concurrency equals scan concurrency.
fn scheduler(provider: &MockProvider, interval: Duration) -> (ScanScheduler, Arc<SignalBoard>) {
    provider.quote("binance", "DOGE/USDT", 0.12, 5.0);
    let cfg = PipelineConfig {
        symbols: vec!["DOGE/USDT".into()],
        exchanges: vec!["binance".into()],
        scan_timeout: Duration::from_secs(10),
        rng_seed: Some(8),
        ..PipelineConfig::default()
    };
    let board = Arc::new(SignalBoard::new());
    let pipeline = ScanPipeline::new(cfg, Arc::new(provider.clone()), board.clone());
    (ScanScheduler::new(pipeline, interval), board)
}

#[tokio::test(start_paused = true)]
async fn test_start_scans_immediately_then_on_interval() {
    let provider = MockProvider::new();
    let (scheduler, board) = scheduler(&provider, Duration::from_millis(5000));

    let handle = scheduler.start();
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(provider.calls(), 1);
    assert_eq!(board.last_report().await.unwrap().scan_number, 1);

    tokio::time::sleep(Duration::from_millis(5000)).await;
    assert_eq!(provider.calls(), 2);

    tokio::time::sleep(Duration::from_millis(10_000)).await;
    assert_eq!(provider.calls(), 4);

    handle.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_slow_scans_never_overlap() {
    let provider = MockProvider::new();
    provider.set_delay(Duration::from_millis(350));
    let (scheduler, board) = scheduler(&provider, Duration::from_millis(100));

    let handle = scheduler.start();
    tokio::time::sleep(Duration::from_millis(3000)).await;
    handle.stop().await;

    assert_eq!(provider.max_in_flight(), 1);
    let scans = board.last_report().await.unwrap().scan_number as usize;
    assert_eq!(scans, provider.calls());
    // Ticks during a scan were dropped, not queued
    assert!(scans < 3000 / 100);
    assert!(scans >= 2);
}

#[tokio::test(start_paused = true)]
async fn test_manual_trigger_dropped_while_timer_scan_runs() {
    let provider = MockProvider::new();
    provider.set_delay(Duration::from_millis(500));
    let (scheduler, _board) = scheduler(&provider, Duration::from_secs(60));

    let handle = scheduler.start();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(scheduler.is_scanning());
    assert!(matches!(scheduler.trigger().await, TriggerOutcome::Dropped));

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert!(!scheduler.is_scanning());
    assert!(matches!(scheduler.trigger().await, TriggerOutcome::Completed(_)));

    handle.stop().await;
    assert_eq!(provider.max_in_flight(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_stop_lets_in_flight_scan_finish() {
    let provider = MockProvider::new();
    provider.set_delay(Duration::from_millis(400));
    let (scheduler, board) = scheduler(&provider, Duration::from_millis(1000));

    let handle = scheduler.start();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(scheduler.is_scanning());

    handle.stop().await;
    assert!(!scheduler.is_scanning());
    let report = board.last_report().await.unwrap();
    assert_eq!(report.scan_number, 1);

    // No scan starts after stop
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(provider.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_failing_scans_do_not_kill_the_loop() {
    let provider = MockProvider::new();
    provider.set_error("backend down");
    let (scheduler, board) = scheduler(&provider, Duration::from_millis(1000));

    let handle = scheduler.start();
    tokio::time::sleep(Duration::from_millis(2500)).await;
    assert_eq!(provider.calls(), 3);
    assert!(board.last_report().await.is_none());

    provider.clear_error();
    tokio::time::sleep(Duration::from_millis(1000)).await;
    handle.stop().await;

    assert_eq!(provider.calls(), 4);
    assert_eq!(board.last_report().await.unwrap().scan_number, 4);
}
