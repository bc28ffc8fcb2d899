//! Health check endpoints.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub model_loaded: bool,
    pub model_status: String,
}

/// Full health check: liveness plus model state. "degraded" means the API
/// is up but no model is loaded yet (e.g. warm-up failed).
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let model_status = match state.service.model_info().await {
        Ok(info) => format!("loaded ({} v{})", info.name, info.version),
        Err(_) => "not_loaded".to_string(),
    };
    let model_loaded = state.service.registry().is_loaded().await;

    Json(HealthResponse {
        status: if model_loaded { "healthy" } else { "degraded" },
        service: "PulmoVision API",
        version: env!("CARGO_PKG_VERSION"),
        model_loaded,
        model_status,
    })
}

/// Simple liveness probe for load balancers and monitoring.
pub async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "PulmoVision API",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
