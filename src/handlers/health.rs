use axum::{extract::State, http::StatusCode, Json};
use crate::models::{ErrorResponse, HealthResponse, ReadyResponse};
use crate::state::AppState;
use std::time::Instant;
use tracing::{debug, error};

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    debug!("Health check requested");
    Json(HealthResponse {
        status: "ok".to_string(),
        message: "Server is running".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Readiness check endpoint: ready once the store answers
pub async fn ready_check(
    State(state): State<AppState>,
) -> Result<Json<ReadyResponse>, (StatusCode, Json<ErrorResponse>)> {
    debug!("Readiness check requested");
    let started = Instant::now();
    if let Err(e) = state.coordinator.store().ping().await {
        error!("Readiness check failed: {}", e);
        let status = StatusCode::SERVICE_UNAVAILABLE;
        return Err((status, Json(ErrorResponse::new(status, format!("Store not ready: {}", e)))));
    }
    Ok(Json(ReadyResponse {
        status: "ok".to_string(),
        store_latency_ms: started.elapsed().as_millis() as u64,
    }))
}
