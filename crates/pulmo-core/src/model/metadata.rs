//! Model artifact metadata types.
//!
//! The JSON key names are the on-disk and wire contract inherited from the
//! training pipeline; Rust field names stay idiomatic via serde renames.

use serde::{Deserialize, Serialize};

/// Training-produced configuration (`config.json`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Ordered class list; defines the prediction vector layout.
    pub classes: Vec<String>,

    #[serde(default = "default_img_side")]
    pub img_height: u32,

    #[serde(default = "default_img_side")]
    pub img_width: u32,

    /// Stem convolution width.
    #[serde(default = "default_stem_channels")]
    pub stem_channels: usize,

    /// Output width of each separable block.
    #[serde(default = "default_block_channels")]
    pub block_channels: Vec<usize>,
}

fn default_img_side() -> u32 {
    224
}

fn default_stem_channels() -> usize {
    32
}

fn default_block_channels() -> Vec<usize> {
    vec![64, 128, 128]
}

/// Descriptive metadata (`info_modelo.json`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    #[serde(rename = "nome", default = "default_field")]
    pub name: String,

    #[serde(rename = "versao", default = "default_field")]
    pub version: String,

    #[serde(rename = "arquitetura", default = "default_field")]
    pub architecture: String,
}

fn default_field() -> String {
    "N/A".to_string()
}

/// Information about the active model, exposed at the service boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    #[serde(rename = "nome")]
    pub name: String,

    #[serde(rename = "versao")]
    pub version: String,

    #[serde(rename = "arquitetura")]
    pub architecture: String,

    pub classes: Vec<String>,

    #[serde(rename = "diretorio")]
    pub directory: String,

    #[serde(rename = "parametros")]
    pub parameter_count: usize,

    pub img_height: u32,

    pub img_width: u32,

    #[serde(rename = "carregado")]
    pub loaded: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_parses_training_output() {
        let raw = r#"{
            "classes": ["normal", "pneumonia", "tuberculose"],
            "img_height": 224,
            "img_width": 224
        }"#;
        let config: ModelConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(config.classes.len(), 3);
        assert_eq!(config.img_height, 224);
        assert_eq!(config.stem_channels, 32);
        assert_eq!(config.block_channels, vec![64, 128, 128]);
    }

    #[test]
    fn test_metadata_uses_portuguese_keys() {
        let raw = r#"{
            "nome": "PulmoVision",
            "versao": "1.2.0",
            "arquitetura": "SeparableCNN"
        }"#;
        let metadata: ModelMetadata = serde_json::from_str(raw).unwrap();
        assert_eq!(metadata.name, "PulmoVision");
        assert_eq!(metadata.version, "1.2.0");
        assert_eq!(metadata.architecture, "SeparableCNN");
    }

    #[test]
    fn test_metadata_missing_fields_fall_back() {
        let metadata: ModelMetadata = serde_json::from_str("{}").unwrap();
        assert_eq!(metadata.name, "N/A");
        assert_eq!(metadata.version, "N/A");
    }

    #[test]
    fn test_model_info_serializes_contract_keys() {
        let info = ModelInfo {
            name: "PulmoVision".to_string(),
            version: "1.0.0".to_string(),
            architecture: "SeparableCNN".to_string(),
            classes: vec!["normal".to_string()],
            directory: "v1".to_string(),
            parameter_count: 1234,
            img_height: 224,
            img_width: 224,
            loaded: true,
        };
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["nome"], "PulmoVision");
        assert_eq!(json["versao"], "1.0.0");
        assert_eq!(json["arquitetura"], "SeparableCNN");
        assert_eq!(json["diretorio"], "v1");
        assert_eq!(json["carregado"], true);
    }
}
