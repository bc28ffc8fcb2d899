//! Configuration for the classification pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Pipeline configuration. Every field has a serde default so partial
/// configuration files work; the model root can also come from
/// `PULMO_MODELS_DIR`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Root directory holding one subdirectory per model version
    #[serde(default = "default_models_dir")]
    pub models_dir: PathBuf,

    /// Maximum accepted upload size in megabytes
    #[serde(default = "default_max_image_size_mb")]
    pub max_image_size_mb: usize,

    /// Accepted file extensions (lowercase, without dot)
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,

    /// Square side length the preprocessor resizes to
    #[serde(default = "default_image_size")]
    pub image_size: u32,

    /// Minimum accepted image dimension in pixels
    #[serde(default = "default_min_dimension")]
    pub min_dimension: u32,

    /// Maximum accepted image dimension in pixels
    #[serde(default = "default_max_dimension")]
    pub max_dimension: u32,

    /// Predictions below this confidence carry a review advisory
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f32,

    /// Fixed number of concurrent forward-pass slots
    #[serde(default = "default_execution_slots")]
    pub execution_slots: usize,

    /// Device preference: "cpu", "cuda" or "metal"
    #[serde(default)]
    pub device: Option<String>,

    /// Disclaimer attached to every classification result
    #[serde(default = "default_disclaimer")]
    pub disclaimer: String,
}

impl PipelineConfig {
    pub fn max_image_size_bytes(&self) -> usize {
        self.max_image_size_mb * 1024 * 1024
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            models_dir: default_models_dir(),
            max_image_size_mb: default_max_image_size_mb(),
            allowed_extensions: default_allowed_extensions(),
            image_size: default_image_size(),
            min_dimension: default_min_dimension(),
            max_dimension: default_max_dimension(),
            confidence_threshold: default_confidence_threshold(),
            execution_slots: default_execution_slots(),
            device: None,
            disclaimer: default_disclaimer(),
        }
    }
}

fn default_models_dir() -> PathBuf {
    if let Ok(from_env) = std::env::var("PULMO_MODELS_DIR") {
        let trimmed = from_env.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }

    PathBuf::from("modelos").join("saved_models")
}

fn default_max_image_size_mb() -> usize {
    10
}

fn default_allowed_extensions() -> Vec<String> {
    vec!["jpg".to_string(), "jpeg".to_string(), "png".to_string()]
}

fn default_image_size() -> u32 {
    224
}

fn default_min_dimension() -> u32 {
    100
}

fn default_max_dimension() -> u32 {
    5000
}

fn default_confidence_threshold() -> f32 {
    0.70
}

fn default_execution_slots() -> usize {
    get_num_cpus().min(8)
}

fn default_disclaimer() -> String {
    "Este resultado destina-se exclusivamente a fins de pesquisa e apoio à \
     decisão clínica, não devendo ser utilizado como diagnóstico médico definitivo. \
     A avaliação final deve sempre ser realizada por um profissional de saúde qualificado."
        .to_string()
}

fn get_num_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(4)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_service_policy() {
        let config = PipelineConfig::default();
        assert_eq!(config.max_image_size_mb, 10);
        assert_eq!(config.max_image_size_bytes(), 10 * 1024 * 1024);
        assert_eq!(config.image_size, 224);
        assert_eq!(config.min_dimension, 100);
        assert_eq!(config.max_dimension, 5000);
        assert_eq!(config.confidence_threshold, 0.70);
        assert!(config.allowed_extensions.contains(&"jpeg".to_string()));
        assert!(config.execution_slots >= 1);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{"max_image_size_mb": 2}"#).unwrap();
        assert_eq!(config.max_image_size_mb, 2);
        assert_eq!(config.image_size, 224);
    }
}
