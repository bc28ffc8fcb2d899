//! Service runtime orchestration.

pub mod service;

pub use service::{ClassificationService, WarmupReport};
