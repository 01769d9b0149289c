//! Published scan results.
//!
//! Downstream readers (dashboard, executors) only ever see complete
//! snapshots. A successful scan replaces trends, predictions and
//! opportunities together; a failed scan leaves the last good set in place.

use serde::Serialize;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::strategy::SignalSet;
use crate::types::{Opportunity, Prediction, ScanReport, TrendState};

#[derive(Debug, Clone, Default, Serialize)]
pub struct Snapshot {
    pub trends: BTreeMap<String, TrendState>,
    pub predictions: Vec<Prediction>,
    pub opportunities: Vec<Opportunity>,
    pub last_report: Option<ScanReport>,
}

#[derive(Debug, Default)]
pub struct SignalBoard {
    snapshot: RwLock<Snapshot>,
}

impl SignalBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every snapshot with one scan's output.
    pub async fn publish(&self, signals: SignalSet, report: ScanReport) {
        let mut snapshot = self.snapshot.write().await;
        *snapshot = Snapshot {
            trends: signals.trends,
            predictions: signals.predictions,
            opportunities: signals.opportunities,
            last_report: Some(report),
        };
    }

    /// Record a pass that produced no signals, keeping the current ones.
    pub async fn record_report(&self, report: ScanReport) {
        self.snapshot.write().await.last_report = Some(report);
    }

    pub async fn snapshot(&self) -> Snapshot {
        self.snapshot.read().await.clone()
    }

    pub async fn trends(&self) -> BTreeMap<String, TrendState> {
        self.snapshot.read().await.trends.clone()
    }

    pub async fn predictions(&self) -> Vec<Prediction> {
        self.snapshot.read().await.predictions.clone()
    }

    pub async fn opportunities(&self) -> Vec<Opportunity> {
        self.snapshot.read().await.opportunities.clone()
    }

    pub async fn last_report(&self) -> Option<ScanReport> {
        self.snapshot.read().await.last_report.clone()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
