//! Scan scheduler.
//!
//! `Idle → Scanning → Idle`. A trigger that arrives while a scan is running
//! is dropped, never queued, so at most one scan executes at a time. The
//! timer and manual triggers share the same gate.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use super::pipeline::ScanPipeline;
use crate::types::{ScanError, ScanReport};

/// Result of asking for a scan.
#[derive(Debug)]
pub enum TriggerOutcome {
    Completed(ScanReport),
    /// The scan aborted; previous snapshots are still published.
    Failed(ScanError),
    /// Another scan was in progress.
    Dropped,
}

/// Holds the scheduler in `Scanning` until dropped.
struct ScanGuard<'a>(&'a AtomicBool);

impl Drop for ScanGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

struct Inner {
    pipeline: Mutex<ScanPipeline>,
    scanning: AtomicBool,
    interval: Duration,
}

/// Cheap to clone; clones share the pipeline and the gate.
#[derive(Clone)]
pub struct ScanScheduler {
    inner: Arc<Inner>,
}

impl ScanScheduler {
    pub fn new(pipeline: ScanPipeline, interval: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                pipeline: Mutex::new(pipeline),
                scanning: AtomicBool::new(false),
                interval,
            }),
        }
    }

    pub fn interval(&self) -> Duration {
        self.inner.interval
    }

    pub fn is_scanning(&self) -> bool {
        self.inner.scanning.load(Ordering::Acquire)
    }

    /// Run one scan now unless one is already running.
    ///
    /// Failures are logged here and never propagate further.
    pub async fn trigger(&self) -> TriggerOutcome {
        if self
            .inner
            .scanning
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Scan already in progress, trigger dropped");
            return TriggerOutcome::Dropped;
        }
        let _guard = ScanGuard(&self.inner.scanning);

        let mut pipeline = self.inner.pipeline.lock().await;
        match pipeline.run_scan().await {
            Ok(report) => TriggerOutcome::Completed(report),
            Err(e) => {
                error!(error = %e, "Scan aborted, keeping previous snapshots");
                TriggerOutcome::Failed(e)
            }
        }
    }

    /// Scan once immediately, then on every interval until stopped.
    ///
    /// A zero interval is a degenerate configuration: nothing is scanned
    /// and the task only waits to be stopped.
    pub fn start(&self) -> SchedulerHandle {
        let (stop_tx, mut stop_rx) = watch::channel(false);
        let scheduler = self.clone();
        let period = self.inner.interval;

        let task = tokio::spawn(async move {
            if period.is_zero() {
                let err = ScanError::Config("scan interval must be positive".to_string());
                warn!(error = %err, "Scheduler idle");
                let _ = stop_rx.changed().await;
                return;
            }

            info!(interval_ms = period.as_millis() as u64, "Scan scheduler started");
            scheduler.trigger().await;

            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    biased;
                    _ = stop_rx.changed() => break,
                    _ = ticker.tick() => {
                        if *stop_rx.borrow() {
                            break;
                        }
                        scheduler.trigger().await;
                    }
                }
            }
            info!("Scan scheduler stopped");
        });

        SchedulerHandle { stop_tx, task }
    }
}

/// Stops a running scheduler. Dropping the handle stops it too.
pub struct SchedulerHandle {
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Cancel the timer and wait for any in-flight scan to finish.
    pub async fn stop(self) {
        let _ = self.stop_tx.send(true);
        if let Err(e) = self.task.await {
            error!(error = %e, "Scheduler task ended abnormally");
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
