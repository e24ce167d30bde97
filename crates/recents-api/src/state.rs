use recents_persist::PersistError;
use recents_sync::RecentsService;
use std::sync::Arc;

use crate::config::Config;
use crate::error::ApiError;

/// Shared application state passed to all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub service: Arc<RecentsService>,
}

impl AppState {
    pub fn new(config: Config, service: RecentsService) -> Self {
        Self {
            config: Arc::new(config),
            service: Arc::new(service),
        }
    }

    /// Wrap a service failure, attaching its detail outside production.
    pub fn api_error(&self, source: PersistError) -> ApiError {
        ApiError::Persist {
            source,
            expose_details: !self.config.is_production(),
        }
    }
}
