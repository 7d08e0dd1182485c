use std::sync::Arc;

use lesson_progress_shared::store::ProgressStore;

use crate::config::ConfigError;
use crate::error::AppError;

/// Router state. Holds the store, or the configuration error that kept it from
/// being built so requests can report it.
pub struct AppState<S> {
    store: Result<Arc<S>, ConfigError>,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<S: ProgressStore> AppState<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store: Ok(store) }
    }

    pub fn unconfigured(err: ConfigError) -> Self {
        Self { store: Err(err) }
    }

    pub fn store(&self) -> Result<&S, AppError> {
        self.store
            .as_deref()
            .map_err(|err| AppError::Configuration(err.clone()))
    }
}
