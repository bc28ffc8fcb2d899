//! Forward-pass execution with bounded concurrency.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::{debug, error};

use crate::error::InferenceError;
use crate::model::registry::ModelRegistry;
use crate::preprocessor::PreprocessedTensor;

/// Per-class probabilities in the active model's class-list order.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionVector(Vec<f32>);

impl PredictionVector {
    pub fn new(probabilities: Vec<f32>) -> Self {
        Self(probabilities)
    }

    pub fn probabilities(&self) -> &[f32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn sum(&self) -> f32 {
        self.0.iter().sum()
    }

    /// Index of the highest probability. Exact ties resolve to the lowest
    /// index, so repeated runs pick the same class.
    pub fn argmax(&self) -> usize {
        let mut best = 0;
        for (index, &p) in self.0.iter().enumerate().skip(1) {
            if p > self.0[best] {
                best = index;
            }
        }
        best
    }
}

/// Executes forward passes against the registry's active model.
///
/// Whether the underlying runtime is safe under concurrent forward passes is
/// treated as unverified; a fixed slot pool bounds concurrency and a
/// saturated pool reports `Busy` instead of queueing indefinitely.
pub struct InferenceEngine {
    registry: Arc<ModelRegistry>,
    slots: Semaphore,
}

impl InferenceEngine {
    pub fn new(registry: Arc<ModelRegistry>, execution_slots: usize) -> Self {
        Self {
            registry,
            slots: Semaphore::new(execution_slots),
        }
    }

    /// Run exactly one forward pass over `tensor`.
    pub async fn infer(
        &self,
        tensor: &PreprocessedTensor,
    ) -> Result<PredictionVector, InferenceError> {
        let _permit = self
            .slots
            .try_acquire()
            .map_err(|_| InferenceError::Busy)?;

        let model = self.registry.get_active().await.map_err(|err| {
            error!("No active model for inference: {err}");
            InferenceError::ModelUnavailable
        })?;

        if tensor.height() != model.config.img_height || tensor.width() != model.config.img_width
        {
            return Err(InferenceError::ExecutionFailed(format!(
                "input {}x{} does not match model input {}x{}",
                tensor.width(),
                tensor.height(),
                model.config.img_width,
                model.config.img_height
            )));
        }

        let input = tensor.clone();
        let worker = model.clone();
        let probabilities = tokio::task::spawn_blocking(move || worker.predict(&input))
            .await
            .map_err(|err| InferenceError::ExecutionFailed(err.to_string()))?
            .map_err(|err| InferenceError::ExecutionFailed(err.to_string()))?;

        if probabilities.len() != model.config.classes.len() {
            return Err(InferenceError::ExecutionFailed(format!(
                "{} probabilities for {} classes",
                probabilities.len(),
                model.config.classes.len()
            )));
        }

        debug!("Forward pass complete ({} classes)", probabilities.len());
        Ok(PredictionVector::new(probabilities))
    }
}
