//! Model execution and result synthesis.

pub mod infer;
pub mod synthesis;

pub use infer::{InferenceEngine, PredictionVector};
pub use synthesis::{
    ClassScore, ClassificationResult, ConfidenceTier, ModelProvenance, PredictedOutcome,
    ResultSynthesizer,
};
