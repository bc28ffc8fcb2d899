//! Model registry: owns the single active model and its lifecycle.
//!
//! Readers clone the active `Arc<LoadedModel>` out of a short read lock, so
//! a reload never blocks in-flight inference: the replacement model is built
//! entirely off to the side and published with one write, and the old handle
//! drops once the last inference holding it finishes.

use std::path::PathBuf;
use std::sync::Arc;

use candle_core::DType;
use candle_nn::VarBuilder;
use serde::de::DeserializeOwned;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

use crate::device::DeviceProfile;
use crate::error::RegistryError;
use crate::model::artifact::{self, ArtifactDir, CONFIG_FILE, METADATA_FILE};
use crate::model::metadata::{ModelConfig, ModelInfo, ModelMetadata};
use crate::model::network::ClassifierNetwork;
use crate::preprocessor::PreprocessedTensor;

/// An immutable loaded model version. Replaced on reload, never mutated.
pub struct LoadedModel {
    network: ClassifierNetwork,
    device: DeviceProfile,
    pub config: ModelConfig,
    pub metadata: ModelMetadata,
    pub directory: String,
    pub parameter_count: usize,
}

impl std::fmt::Debug for LoadedModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedModel")
            .field("directory", &self.directory)
            .field("parameter_count", &self.parameter_count)
            .field("config", &self.config)
            .field("metadata", &self.metadata)
            .field("device", &self.device)
            .finish_non_exhaustive()
    }
}

impl LoadedModel {
    /// Load one artifact directory end to end. Blocking.
    pub fn load(artifact: &ArtifactDir, device: &DeviceProfile) -> Result<Self, RegistryError> {
        let missing = artifact.missing_files();
        if !missing.is_empty() {
            return Err(RegistryError::Incomplete {
                dir: artifact.name.clone(),
                missing,
            });
        }

        let config: ModelConfig =
            read_json(&artifact.config_path(), CONFIG_FILE, &artifact.name)?;
        if config.classes.is_empty() {
            return Err(RegistryError::LoadFailed(format!(
                "artifact '{}' declares no classes",
                artifact.name
            )));
        }
        let metadata: ModelMetadata =
            read_json(&artifact.metadata_path(), METADATA_FILE, &artifact.name)?;

        let tensors = candle_core::safetensors::load(artifact.weights_path(), &device.device)
            .map_err(|err| RegistryError::LoadFailed(err.to_string()))?;
        let parameter_count = tensors.values().map(|t| t.elem_count()).sum();

        let vb = VarBuilder::from_tensors(tensors, DType::F32, &device.device);
        let network = ClassifierNetwork::load(&config, vb)
            .map_err(|err| RegistryError::LoadFailed(err.to_string()))?;

        info!(
            "Loaded model '{}' v{} ({}, {} parameters) from '{}'",
            metadata.name, metadata.version, metadata.architecture, parameter_count, artifact.name
        );

        Ok(Self {
            network,
            device: device.clone(),
            config,
            metadata,
            directory: artifact.name.clone(),
            parameter_count,
        })
    }

    /// One forward pass over a preprocessed image; returns per-class
    /// probabilities in class-list order.
    pub fn predict(&self, tensor: &PreprocessedTensor) -> candle_core::Result<Vec<f32>> {
        let input = candle_core::Tensor::from_slice(
            tensor.data(),
            (1, tensor.height() as usize, tensor.width() as usize, 3),
            &self.device.device,
        )?
        // NHWC in, NCHW for the convolution stack.
        .permute((0, 3, 1, 2))?;

        let logits = self.network.forward(&input)?;
        let probabilities = candle_nn::ops::softmax(&logits, candle_core::D::Minus1)?;
        probabilities.squeeze(0)?.to_vec1::<f32>()
    }

    pub fn info(&self) -> ModelInfo {
        ModelInfo {
            name: self.metadata.name.clone(),
            version: self.metadata.version.clone(),
            architecture: self.metadata.architecture.clone(),
            classes: self.config.classes.clone(),
            directory: self.directory.clone(),
            parameter_count: self.parameter_count,
            img_height: self.config.img_height,
            img_width: self.config.img_width,
            loaded: true,
        }
    }
}

fn read_json<T: DeserializeOwned>(
    path: &std::path::Path,
    file_name: &'static str,
    dir: &str,
) -> Result<T, RegistryError> {
    let raw = std::fs::read_to_string(path).map_err(|_| RegistryError::Incomplete {
        dir: dir.to_string(),
        missing: vec![file_name],
    })?;
    serde_json::from_str(&raw).map_err(|source| RegistryError::Malformed {
        file: format!("{dir}/{file_name}"),
        source,
    })
}

/// Discovers, loads and atomically swaps versioned model artifacts.
pub struct ModelRegistry {
    models_dir: PathBuf,
    device: DeviceProfile,
    active: RwLock<Option<Arc<LoadedModel>>>,
    /// Serializes first load and reloads; readers never take it.
    load_lock: Mutex<()>,
}

impl ModelRegistry {
    pub fn new(models_dir: PathBuf, device: DeviceProfile) -> Self {
        Self {
            models_dir,
            device,
            active: RwLock::new(None),
            load_lock: Mutex::new(()),
        }
    }

    pub fn models_dir(&self) -> &std::path::Path {
        &self.models_dir
    }

    /// Active model handle, loading lazily on first use. A failed first
    /// load leaves the registry unavailable and is retried on next access.
    pub async fn get_active(&self) -> Result<Arc<LoadedModel>, RegistryError> {
        if let Some(model) = self.active.read().await.as_ref() {
            return Ok(model.clone());
        }

        let _guard = self.load_lock.lock().await;
        // Another caller may have finished the first load while we waited.
        if let Some(model) = self.active.read().await.as_ref() {
            return Ok(model.clone());
        }

        let model = self.load_latest().await?;
        *self.active.write().await = Some(model.clone());
        Ok(model)
    }

    /// Re-run discovery and publish the newest complete artifact. On any
    /// failure the previous active model (if any) keeps serving.
    pub async fn reload(&self) -> Result<Arc<LoadedModel>, RegistryError> {
        let _guard = self.load_lock.lock().await;
        match self.load_latest().await {
            Ok(model) => {
                info!("Published reloaded model from '{}'", model.directory);
                *self.active.write().await = Some(model.clone());
                Ok(model)
            }
            Err(err) => {
                warn!("Model reload failed, keeping previous active model: {err}");
                Err(err)
            }
        }
    }

    /// Metadata of the active model; does not trigger a load.
    pub async fn metadata(&self) -> Result<ModelInfo, RegistryError> {
        let active = self.active.read().await;
        let model = active.as_ref().ok_or(RegistryError::Unavailable)?;
        Ok(model.info())
    }

    pub async fn is_loaded(&self) -> bool {
        self.active.read().await.is_some()
    }

    async fn load_latest(&self) -> Result<Arc<LoadedModel>, RegistryError> {
        let models_dir = self.models_dir.clone();
        let device = self.device.clone();
        tokio::task::spawn_blocking(move || {
            let artifact = artifact::discover_latest(&models_dir)?;
            LoadedModel::load(&artifact, &device).map(Arc::new)
        })
        .await
        .map_err(|err| RegistryError::LoadFailed(err.to_string()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil;

    #[tokio::test]
    async fn test_first_access_loads_and_caches() {
        let root = tempfile::tempdir().unwrap();
        testutil::write_artifact(root.path(), "v1");

        let registry = ModelRegistry::new(root.path().to_path_buf(), DeviceProfile::cpu());
        assert!(!registry.is_loaded().await);

        let first = registry.get_active().await.unwrap();
        let second = registry.get_active().await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.config.classes.len(), 3);
        assert!(first.parameter_count > 0);
    }

    #[tokio::test]
    async fn test_metadata_requires_loaded_model() {
        let root = tempfile::tempdir().unwrap();
        testutil::write_artifact(root.path(), "v1");

        let registry = ModelRegistry::new(root.path().to_path_buf(), DeviceProfile::cpu());
        assert!(matches!(
            registry.metadata().await.unwrap_err(),
            RegistryError::Unavailable
        ));

        registry.get_active().await.unwrap();
        let info = registry.metadata().await.unwrap();
        assert_eq!(info.directory, "v1");
        assert!(info.loaded);
    }

    #[tokio::test]
    async fn test_reload_failure_keeps_previous_model() {
        let root = tempfile::tempdir().unwrap();
        testutil::write_artifact(root.path(), "v1");

        let registry = ModelRegistry::new(root.path().to_path_buf(), DeviceProfile::cpu());
        let before = registry.get_active().await.unwrap();

        // Empty the model root; the reload must fail without evicting v1.
        std::fs::remove_dir_all(root.path().join("v1")).unwrap();
        let err = registry.reload().await.unwrap_err();
        assert!(matches!(err, RegistryError::NotFound(_)));

        let after = registry.get_active().await.unwrap();
        assert!(Arc::ptr_eq(&before, &after));
    }

    #[tokio::test]
    async fn test_reload_publishes_newer_artifact() {
        let root = tempfile::tempdir().unwrap();
        testutil::write_artifact(root.path(), "v1");

        let registry = ModelRegistry::new(root.path().to_path_buf(), DeviceProfile::cpu());
        let first = registry.get_active().await.unwrap();
        assert_eq!(first.directory, "v1");

        std::thread::sleep(std::time::Duration::from_millis(100));
        testutil::write_artifact(root.path(), "v2");

        let reloaded = registry.reload().await.unwrap();
        assert_eq!(reloaded.directory, "v2");
        assert_eq!(registry.get_active().await.unwrap().directory, "v2");
    }

    #[tokio::test]
    async fn test_malformed_config_is_reported() {
        let root = tempfile::tempdir().unwrap();
        testutil::write_artifact(root.path(), "v1");
        std::fs::write(root.path().join("v1").join(CONFIG_FILE), "{ not json").unwrap();

        let registry = ModelRegistry::new(root.path().to_path_buf(), DeviceProfile::cpu());
        let err = registry.get_active().await.unwrap_err();
        assert!(matches!(err, RegistryError::Malformed { .. }));
    }

    #[tokio::test]
    async fn test_failed_first_load_is_retried_lazily() {
        let root = tempfile::tempdir().unwrap();

        let registry = ModelRegistry::new(root.path().to_path_buf(), DeviceProfile::cpu());
        assert!(registry.get_active().await.is_err());
        assert!(!registry.is_loaded().await);

        testutil::write_artifact(root.path(), "v1");
        let model = registry.get_active().await.unwrap();
        assert_eq!(model.directory, "v1");
    }
}
