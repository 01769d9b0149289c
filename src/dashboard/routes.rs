//! Dashboard API route handlers.
//!
//! All endpoints return JSON. State is shared via `Arc<DashboardState>`.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::engine::{ScanScheduler, SignalBoard, TriggerOutcome};
use crate::types::{Opportunity, Prediction, ScanReport, TrendState};

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// Shared state accessible by all route handlers.
pub struct DashboardState {
    pub board: Arc<SignalBoard>,
    pub scheduler: ScanScheduler,
}

impl DashboardState {
    pub fn new(board: Arc<SignalBoard>, scheduler: ScanScheduler) -> Self {
        Self { board, scheduler }
    }
}

pub type AppState = Arc<DashboardState>;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ScanStatusResponse {
    pub scanning: bool,
    pub interval_ms: u64,
    pub last_report: Option<ScanReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

/// GET /api/trends
pub async fn get_trends(State(state): State<AppState>) -> Json<BTreeMap<String, TrendState>> {
    Json(state.board.trends().await)
}

/// GET /api/predictions
pub async fn get_predictions(State(state): State<AppState>) -> Json<Vec<Prediction>> {
    Json(state.board.predictions().await)
}

/// GET /api/opportunities (ranked)
pub async fn get_opportunities(State(state): State<AppState>) -> Json<Vec<Opportunity>> {
    Json(state.board.opportunities().await)
}

/// GET /api/scan
pub async fn get_scan_status(State(state): State<AppState>) -> Json<ScanStatusResponse> {
    Json(ScanStatusResponse {
        scanning: state.scheduler.is_scanning(),
        interval_ms: state.scheduler.interval().as_millis() as u64,
        last_report: state.board.last_report().await,
    })
}

/// POST /api/scan
pub async fn trigger_scan(State(state): State<AppState>) -> Response {
    match state.scheduler.trigger().await {
        TriggerOutcome::Completed(report) => (StatusCode::OK, Json(report)).into_response(),
        TriggerOutcome::Dropped => (
            StatusCode::CONFLICT,
            Json(ErrorResponse {
                error: "scan already in progress".to_string(),
            }),
        )
            .into_response(),
        TriggerOutcome::Failed(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response(),
    }
}

/// GET /health
pub async fn health() -> StatusCode {
    StatusCode::OK
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
