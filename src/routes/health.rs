use std::time::Instant;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::state::AppState;
use crate::store::migrate;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(health_check))
        .route("/live", get(liveness))
        .route("/ready", get(readiness))
        .route("/database", get(database_health))
}

async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "quest-engine",
        "version": env!("CARGO_PKG_VERSION"),
        "uptimeSecs": state.uptime_secs(),
    }))
}

async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// Ready once migrations have run and the curriculum table parses.
async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    let migrated = migrate::get_current_version(state.store())
        .map(|v| v > 0)
        .unwrap_or(false);
    let curriculum_ok = state.store().load_curriculum().is_ok();
    let status = if migrated && curriculum_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (
        status,
        Json(serde_json::json!({
            "ready": status == StatusCode::OK,
            "migrated": migrated,
            "curriculum": curriculum_ok,
        })),
    )
}

async fn database_health(State(state): State<AppState>) -> impl IntoResponse {
    let start = Instant::now();
    let probe = state.store().get_quest("__health_check__");
    let latency_us = start.elapsed().as_micros() as u64;
    if let Err(e) = &probe {
        tracing::warn!(error = %e, "Database health probe failed");
    }

    Json(serde_json::json!({
        "healthy": probe.is_ok(),
        "latencyUs": latency_us,
        "sizeOnDisk": state.store().raw_db().size_on_disk().ok(),
    }))
}
