//! Application state for the receipt settlement API.

use std::sync::Arc;

use crate::config::ConfigLoader;
use crate::store::ReceiptStore;

/// Shared application state.
///
/// Holds the loaded configuration and the receipt store shared by every
/// request handler.
#[derive(Clone)]
pub struct AppState {
    config: Arc<ConfigLoader>,
    store: Arc<dyn ReceiptStore>,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(config: ConfigLoader, store: Arc<dyn ReceiptStore>) -> Self {
        Self {
            config: Arc::new(config),
            store,
        }
    }

    /// Returns a reference to the configuration loader.
    pub fn config(&self) -> &ConfigLoader {
        &self.config
    }

    /// Returns the receipt store.
    pub fn store(&self) -> &dyn ReceiptStore {
        self.store.as_ref()
    }
}
