//! Pulmo Core - Chest Radiograph Classification Engine
//!
//! This crate provides the inference serving pipeline behind the PulmoVision
//! API: versioned model lifecycle management, upload validation,
//! deterministic preprocessing, bounded-concurrency model execution and
//! safety-annotated result synthesis.
//!
//! # Architecture
//!
//! Raw bytes flow through `ImageValidator` → `Preprocessor` →
//! `InferenceEngine` (reading the `ModelRegistry`'s active model) →
//! `ResultSynthesizer`. `ClassificationService` wires the pieces together
//! and is the only type the boundary layer needs.
//!
//! # Example
//!
//! ```ignore
//! use pulmo_core::{ClassificationService, PipelineConfig};
//!
//! let service = ClassificationService::new(PipelineConfig::default())?;
//! service.validate_image(&bytes, Some("torax.png"))?;
//! let result = service.classify(bytes).await?;
//! println!("{} ({:.1}%)", result.outcome.label, result.outcome.confidence * 100.0);
//! ```

pub mod config;
pub mod device;
pub mod engine;
pub mod error;
pub mod model;
pub mod preprocessor;
pub mod runtime;
pub mod validator;

#[cfg(test)]
pub(crate) mod testutil;

pub use config::PipelineConfig;
pub use engine::{
    ClassScore, ClassificationResult, ConfidenceTier, InferenceEngine, ModelProvenance,
    PredictedOutcome, PredictionVector, ResultSynthesizer,
};
pub use error::{Error, InferenceError, RegistryError, Result, ValidationError};
pub use model::{LoadedModel, ModelConfig, ModelInfo, ModelMetadata, ModelRegistry};
pub use preprocessor::{PreprocessedTensor, Preprocessor};
pub use runtime::{ClassificationService, WarmupReport};
pub use validator::{ImageValidator, ValidationReport};
