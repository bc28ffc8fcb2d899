//! Error types for the classification pipeline.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Client-caused input rejection. Display strings are surfaced verbatim to
/// the caller, in the service language.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Imagem muito grande: {size_mb:.2}MB. Tamanho máximo: {max_mb}MB")]
    TooLarge { size_mb: f64, max_mb: usize },

    #[error("Formato não suportado: .{extension}. Formatos aceitos: {allowed}")]
    UnsupportedFormat { extension: String, allowed: String },

    #[error("Imagem corrompida ou inválida: {0}")]
    Corrupt(String),

    #[error(
        "Dimensões inválidas: {width}x{height}. Intervalo aceito: {min}x{min} a {max}x{max}"
    )]
    DimensionOutOfRange {
        width: u32,
        height: u32,
        min: u32,
        max: u32,
    },
}

/// Model artifact discovery and loading failures. Operational: logged in
/// full, never surfaced verbatim to clients.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("no complete model artifact found under {0}")]
    NotFound(PathBuf),

    #[error("model artifact '{dir}' is missing required files: {missing:?}")]
    Incomplete {
        dir: String,
        missing: Vec<&'static str>,
    },

    #[error("failed to parse {file}: {source}")]
    Malformed {
        file: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to load model weights: {0}")]
    LoadFailed(String),

    #[error("no model loaded")]
    Unavailable,
}

/// Forward-pass execution failures.
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("no model available for inference")]
    ModelUnavailable,

    #[error("forward pass failed: {0}")]
    ExecutionFailed(String),

    #[error("all execution slots are busy")]
    Busy,
}

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Inference(#[from] InferenceError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
