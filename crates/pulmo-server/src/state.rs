//! Shared application state.

use std::sync::Arc;

use pulmo_core::ClassificationService;

/// Shared state; the service is instantiated once and cheap to clone around.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ClassificationService>,
}

impl AppState {
    pub fn new(service: ClassificationService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}
