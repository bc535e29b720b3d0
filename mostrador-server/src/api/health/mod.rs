//! Health check routes
//!
//! | Path | Method | Meaning |
//! |------|--------|---------|
//! | /health | GET | liveness |
//! | /health/detailed | GET | store round-trip and uptime |

use std::time::Instant;

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;
use shared::models::BUSINESS_PROFILE_ID;

use crate::core::ServerState;
use crate::core::config::StoreBackend;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/detailed", get(detailed_health))
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

#[derive(Serialize)]
pub struct DetailedHealthResponse {
    status: &'static str,
    version: &'static str,
    environment: String,
    uptime_seconds: u64,
    store: CheckResult,
}

#[derive(Serialize)]
pub struct CheckResult {
    status: &'static str,
    backend: &'static str,
    latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub async fn detailed_health(State(state): State<ServerState>) -> Json<DetailedHealthResponse> {
    let backend = match state.config.backend {
        StoreBackend::Local => "local",
        StoreBackend::Remote { .. } => "remote",
    };

    let started = Instant::now();
    let store = match state.store.settings.get(BUSINESS_PROFILE_ID).await {
        Ok(_) => CheckResult {
            status: "ok",
            backend,
            latency_ms: Some(started.elapsed().as_millis() as u64),
            message: None,
        },
        Err(e) => CheckResult {
            status: "error",
            backend,
            latency_ms: None,
            message: Some(e.to_string()),
        },
    };

    Json(DetailedHealthResponse {
        status: if store.status == "ok" { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        environment: state.config.environment.clone(),
        uptime_seconds: state.uptime().as_secs(),
        store,
    })
}
