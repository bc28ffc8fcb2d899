//! Classification service orchestrator.
//!
//! The single entry point the boundary layer talks to. Owns every pipeline
//! component; instantiated once at startup and shared by reference.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::info;

use crate::config::PipelineConfig;
use crate::device::DeviceSelector;
use crate::engine::{ClassificationResult, InferenceEngine, ResultSynthesizer};
use crate::error::{InferenceError, Result, ValidationError};
use crate::model::{ModelInfo, ModelRegistry};
use crate::preprocessor::{PreprocessedTensor, Preprocessor};
use crate::validator::{ImageValidator, ValidationReport};

/// Outcome of a successful warm-up. Warm-up failures surface as errors so
/// callers can observe a degraded service instead of a hidden one.
#[derive(Debug, Clone, Serialize)]
pub struct WarmupReport {
    pub model_version: String,
    pub model_directory: String,
    pub elapsed_ms: u64,
}

pub struct ClassificationService {
    config: PipelineConfig,
    validator: ImageValidator,
    preprocessor: Arc<Preprocessor>,
    registry: Arc<ModelRegistry>,
    engine: InferenceEngine,
    synthesizer: ResultSynthesizer,
}

impl ClassificationService {
    pub fn new(config: PipelineConfig) -> Result<Self> {
        let device = DeviceSelector::detect_with_preference(config.device.as_deref())?;
        let registry = Arc::new(ModelRegistry::new(config.models_dir.clone(), device));
        let engine = InferenceEngine::new(registry.clone(), config.execution_slots);

        Ok(Self {
            validator: ImageValidator::new(&config),
            preprocessor: Arc::new(Preprocessor::new(&config)),
            synthesizer: ResultSynthesizer::new(&config),
            registry,
            engine,
            config,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<ModelRegistry> {
        &self.registry
    }

    /// Validate an upload without classifying it.
    pub fn validate_image(
        &self,
        bytes: &[u8],
        filename: Option<&str>,
    ) -> Result<ValidationReport, ValidationError> {
        self.validator.validate(bytes, filename)
    }

    /// Classify one image: preprocess, forward pass, synthesize.
    pub async fn classify(&self, bytes: Vec<u8>) -> Result<ClassificationResult> {
        let preprocessor = self.preprocessor.clone();
        let tensor = tokio::task::spawn_blocking(move || preprocessor.preprocess(&bytes))
            .await
            .map_err(|err| InferenceError::ExecutionFailed(err.to_string()))??;

        let prediction = self.engine.infer(&tensor).await?;

        let model = self
            .registry
            .get_active()
            .await
            .map_err(|_| InferenceError::ModelUnavailable)?;
        if prediction.len() != model.config.classes.len() {
            return Err(InferenceError::ExecutionFailed(format!(
                "{} probabilities for {} classes",
                prediction.len(),
                model.config.classes.len()
            ))
            .into());
        }

        Ok(self
            .synthesizer
            .synthesize(&prediction, &model.config.classes, &model.metadata))
    }

    /// Information about the active model.
    pub async fn model_info(&self) -> Result<ModelInfo> {
        Ok(self.registry.metadata().await?)
    }

    /// Re-run artifact discovery and swap in the newest complete version.
    pub async fn reload_model(&self) -> Result<ModelInfo> {
        let model = self.registry.reload().await?;
        Ok(model.info())
    }

    /// Load the active model and run one dummy forward pass so the first
    /// client request does not pay the one-off load cost.
    pub async fn warm_up(&self) -> Result<WarmupReport> {
        let started = Instant::now();

        let model = self.registry.get_active().await?;
        let tensor = PreprocessedTensor::zeros(model.config.img_height, model.config.img_width);
        self.engine.infer(&tensor).await?;

        let report = WarmupReport {
            model_version: model.metadata.version.clone(),
            model_directory: model.directory.clone(),
            elapsed_ms: started.elapsed().as_millis() as u64,
        };
        info!(
            "Warm-up complete: model v{} from '{}' in {}ms",
            report.model_version, report.model_directory, report.elapsed_ms
        );
        Ok(report)
    }
}
