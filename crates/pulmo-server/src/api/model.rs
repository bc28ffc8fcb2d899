//! Model information and lifecycle endpoints.

use axum::extract::State;
use axum::Json;
use tracing::info;

use pulmo_core::ModelInfo;

use crate::error::ApiError;
use crate::state::AppState;

/// Information about the active model.
pub async fn model_info(State(state): State<AppState>) -> Result<Json<ModelInfo>, ApiError> {
    let info = state.service.model_info().await?;
    Ok(Json(info))
}

/// Re-run artifact discovery and swap in the newest complete version. On
/// failure the previous model keeps serving and the error is reported.
pub async fn reload_model(State(state): State<AppState>) -> Result<Json<ModelInfo>, ApiError> {
    info!("Model reload requested");
    let info = state.service.reload_model().await?;
    Ok(Json(info))
}
