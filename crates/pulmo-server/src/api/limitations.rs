//! System limitations endpoint.
//!
//! Transparency about what the model can and cannot do, for display to
//! clinical users before they rely on a prediction.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct LimitationsResponse {
    pub limitacoes_tecnicas: Vec<&'static str>,
    pub limitacoes_clinicas: Vec<&'static str>,
    pub recomendacoes_uso: Vec<&'static str>,
    pub aviso_legal: String,
}

pub async fn limitations(State(state): State<AppState>) -> Json<LimitationsResponse> {
    Json(LimitationsResponse {
        limitacoes_tecnicas: vec![
            "Dataset de treino limitado (~6.500 imagens)",
            "Treinado principalmente em crianças (1-5 anos) - performance pode variar em adultos",
            "Resolução de entrada reduzida para 224x224 pixels (perda de detalhes finos)",
            "Não detecta outras doenças além de pneumonia e tuberculose",
            "Performance degradada em imagens de baixa qualidade",
            "Sensível a artefatos (marcadores, eletrodos, próteses)",
            "Não quantifica gravidade da doença",
            "Não localiza especificamente os achados radiológicos",
        ],
        limitacoes_clinicas: vec![
            "Não tem acesso ao contexto clínico do paciente",
            "Não considera história clínica, sintomas ou exames laboratoriais",
            "Dificuldade em casos com múltiplas patologias simultâneas",
            "Apresentações atípicas de doenças podem não ser reconhecidas",
            "Estágios iniciais de doenças podem passar despercebidos",
            "Não substitui avaliação de profissional de saúde qualificado",
        ],
        recomendacoes_uso: vec![
            "Use apenas como ferramenta de TRIAGEM e APOIO à decisão",
            "SEMPRE revise resultados com profissional qualificado",
            "Considere confiança da predição: < 70% requer atenção especial",
            "Não use como diagnóstico definitivo",
            "Valide em sua população antes de uso clínico",
        ],
        aviso_legal: state.service.config().disclaimer.clone(),
    })
}
