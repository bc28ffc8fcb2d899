//! API error handling
//!
//! Validation failures are client-caused and surfaced verbatim; registry and
//! inference failures are logged in full but reach the client as a generic
//! message only.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

/// API error type
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.into(),
        }
    }

    pub fn payload_too_large(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::PAYLOAD_TOO_LARGE,
            message: msg.into(),
        }
    }

    pub fn service_unavailable(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::SERVICE_UNAVAILABLE,
            message: msg.into(),
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let error_type = match self.status {
            StatusCode::BAD_REQUEST => "invalid_image",
            StatusCode::PAYLOAD_TOO_LARGE => "image_too_large",
            StatusCode::SERVICE_UNAVAILABLE => "service_unavailable",
            _ => "prediction_error",
        };
        let timestamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0);

        let body = Json(json!({
            "error": {
                "type": error_type,
                "message": self.message,
                "timestamp": timestamp,
            }
        }));
        (self.status, body).into_response()
    }
}

impl From<pulmo_core::Error> for ApiError {
    fn from(err: pulmo_core::Error) -> Self {
        use pulmo_core::{Error, InferenceError, ValidationError};

        match &err {
            Error::Validation(ValidationError::TooLarge { .. }) => {
                ApiError::payload_too_large(err.to_string())
            }
            Error::Validation(_) => ApiError::bad_request(err.to_string()),
            Error::Inference(InferenceError::Busy) => {
                ApiError::service_unavailable("Serviço ocupado. Tente novamente em instantes.")
            }
            Error::Inference(InferenceError::ModelUnavailable) | Error::Registry(_) => {
                error!("Model unavailable: {err}");
                ApiError::service_unavailable(
                    "Modelo não disponível. Tente novamente mais tarde.",
                )
            }
            _ => {
                error!("Prediction failed: {err}");
                ApiError::internal(
                    "Erro interno ao processar a imagem. Por favor, tente novamente.",
                )
            }
        }
    }
}
