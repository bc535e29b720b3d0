//! Dashboard API Handlers

use axum::{Json, extract::State};
use shared::util::now_millis;

use crate::core::ServerState;
use crate::metrics::DashboardMetrics;

/// GET /api/dashboard - headline figures
///
/// Never fails: an unreadable store yields zeroed metrics.
pub async fn get_dashboard(State(state): State<ServerState>) -> Json<DashboardMetrics> {
    Json(state.reports().dashboard(now_millis()).await)
}
