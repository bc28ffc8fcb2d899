use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Create the main API router.
pub fn create_router(state: AppState) -> Router {
    // Leave headroom for multipart framing on top of the image cap.
    let body_limit = state.service.config().max_image_size_bytes() + 1024 * 1024;

    Router::new()
        .route("/", get(crate::api::health::root))
        .route("/health", get(crate::api::health::health_check))
        .route("/predict", post(crate::api::predict::predict))
        .route("/model", get(crate::api::model::model_info))
        .route("/model/info", get(crate::api::model::model_info))
        .route("/model/reload", post(crate::api::model::reload_model))
        .route("/limitations", get(crate::api::limitations::limitations))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
