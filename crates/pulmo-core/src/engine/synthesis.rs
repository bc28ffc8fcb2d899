//! Safety-annotated result synthesis.
//!
//! Turns a raw probability vector into the structured record returned to
//! clients. JSON key names are the wire contract of the service.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::config::PipelineConfig;
use crate::engine::infer::PredictionVector;
use crate::model::metadata::ModelMetadata;

const LOW_CONFIDENCE_ADVISORY: &str =
    "Confiança baixa (< 70%). Recomenda-se revisão por especialista.";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PredictedOutcome {
    #[serde(rename = "rotulo")]
    pub label: String,

    #[serde(rename = "confianca")]
    pub confidence: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClassScore {
    #[serde(rename = "classe")]
    pub label: String,

    #[serde(rename = "probabilidade")]
    pub probability: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelProvenance {
    #[serde(rename = "nome")]
    pub name: String,

    #[serde(rename = "arquitetura")]
    pub architecture: String,

    #[serde(rename = "versao")]
    pub version: String,
}

/// The structured classification record. Carries the disclaimer
/// unconditionally.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClassificationResult {
    #[serde(rename = "resultado")]
    pub outcome: PredictedOutcome,

    /// All classes, sorted descending by probability.
    #[serde(rename = "probabilidades")]
    pub probabilities: Vec<ClassScore>,

    #[serde(rename = "modelo")]
    pub model: ModelProvenance,

    #[serde(rename = "aviso_legal")]
    pub disclaimer: String,

    /// Present only when confidence falls below the advisory threshold.
    #[serde(
        rename = "aviso_confianca",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub advisory: Option<String>,

    #[serde(rename = "interpretacao")]
    pub interpretation: String,
}

/// Confidence bucket used to select interpretation wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceTier {
    High,
    Moderate,
    Low,
}

impl ConfidenceTier {
    pub fn from_confidence(confidence: f32) -> Self {
        if confidence >= 0.90 {
            Self::High
        } else if confidence >= 0.70 {
            Self::Moderate
        } else {
            Self::Low
        }
    }

    fn qualifier(&self) -> &'static str {
        match self {
            Self::High => "Alta confiança na classificação.",
            Self::Moderate => "Confiança moderada. Considerar contexto clínico.",
            Self::Low => "Baixa confiança. Revisão por especialista recomendada.",
        }
    }
}

fn base_description(label: &str) -> &'static str {
    match label {
        "normal" => "Radiografia sem achados patológicos evidentes.",
        "pneumonia" => "Achados sugestivos de pneumonia. Correlacionar com clínica.",
        "tuberculose" => {
            "Achados compatíveis com tuberculose. Investigação adicional recomendada."
        }
        _ => "Classificação não reconhecida.",
    }
}

pub struct ResultSynthesizer {
    advisory_threshold: f32,
    disclaimer: String,
}

impl ResultSynthesizer {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            advisory_threshold: config.confidence_threshold,
            disclaimer: config.disclaimer.clone(),
        }
    }

    /// Build the classification record. `prediction` and `classes` must have
    /// the same length (the engine guarantees it).
    pub fn synthesize(
        &self,
        prediction: &PredictionVector,
        classes: &[String],
        metadata: &ModelMetadata,
    ) -> ClassificationResult {
        debug_assert_eq!(prediction.len(), classes.len());

        let index = prediction.argmax();
        let confidence = prediction.probabilities()[index];
        let label = classes[index].clone();

        let mut probabilities: Vec<ClassScore> = classes
            .iter()
            .zip(prediction.probabilities())
            .map(|(label, &probability)| ClassScore {
                label: label.clone(),
                probability,
            })
            .collect();
        // Stable sort: equal scores keep class-list order.
        probabilities.sort_by(|a, b| {
            b.probability
                .partial_cmp(&a.probability)
                .unwrap_or(Ordering::Equal)
        });

        let advisory = if confidence < self.advisory_threshold {
            Some(LOW_CONFIDENCE_ADVISORY.to_string())
        } else {
            None
        };

        let tier = ConfidenceTier::from_confidence(confidence);
        let interpretation = format!("{} {}", base_description(&label), tier.qualifier());

        ClassificationResult {
            outcome: PredictedOutcome { label, confidence },
            probabilities,
            model: ModelProvenance {
                name: metadata.name.clone(),
                architecture: metadata.architecture.clone(),
                version: metadata.version.clone(),
            },
            disclaimer: self.disclaimer.clone(),
            advisory,
            interpretation,
        }
    }
}
