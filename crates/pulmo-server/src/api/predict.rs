//! Prediction endpoint.

use axum::extract::{Multipart, State};
use axum::Json;
use tracing::{info, warn};

use pulmo_core::ClassificationResult;

use crate::error::ApiError;
use crate::state::AppState;

/// Classify one chest radiograph uploaded as the multipart field `file`.
pub async fn predict(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ClassificationResult>, ApiError> {
    let mut upload: Option<(Vec<u8>, Option<String>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| ApiError::bad_request(format!("Formulário inválido: {err}")))?
    {
        if field.name() == Some("file") {
            let filename = field.file_name().map(str::to_string);
            let bytes = field
                .bytes()
                .await
                .map_err(|err| ApiError::bad_request(format!("Falha ao ler o arquivo: {err}")))?;
            upload = Some((bytes.to_vec(), filename));
            break;
        }
    }

    let (bytes, filename) =
        upload.ok_or_else(|| ApiError::bad_request("Campo 'file' ausente no formulário"))?;

    info!("Nova requisição de predição: {:?}", filename);

    let report = state
        .service
        .validate_image(&bytes, filename.as_deref())
        .map_err(pulmo_core::Error::from)?;
    for warning in &report.warnings {
        warn!("{warning}");
    }

    let result = state.service.classify(bytes).await?;
    info!(
        "Predição concluída: {} (confiança: {:.2}%)",
        result.outcome.label,
        result.outcome.confidence * 100.0
    );

    Ok(Json(result))
}
