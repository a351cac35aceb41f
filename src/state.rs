use std::sync::Arc;

use crate::api::{Backend, HttpBackend};
use crate::config::Config;
use crate::error::AppError;
use crate::utils::notify::{Notifier, TracingNotifier};
use crate::utils::storage::{JsonFileStore, KeyValueStore};

/// Collaborators shared by every page controller.
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn Backend>,
    pub notifier: Arc<dyn Notifier>,
    pub store: Arc<dyn KeyValueStore>,
    pub config: Config,
}

impl AppState {
    /// HTTP backend, tracing notices and the on-disk state file.
    pub fn from_config(config: Config) -> Result<Self, AppError> {
        let backend = HttpBackend::new(&config.api_url, config.api_token.clone())?;
        let store = JsonFileStore::open(&config.state_file)?;

        Ok(Self {
            backend: Arc::new(backend),
            notifier: Arc::new(TracingNotifier),
            store: Arc::new(store),
            config,
        })
    }

    pub fn new(
        backend: Arc<dyn Backend>,
        notifier: Arc<dyn Notifier>,
        store: Arc<dyn KeyValueStore>,
        config: Config,
    ) -> Self {
        Self {
            backend,
            notifier,
            store,
            config,
        }
    }
}
