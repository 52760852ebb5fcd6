//! Shared application state.
//!
//! Contains the state that is shared across all request handlers:
//! configuration, the auth config store, URL builder and account backend.

use crate::auth::{AuthConfigStore, AuthUrlBuilder};
use crate::backend::AccountBackend;
use crate::config::ConfigV1;
use std::sync::Arc;

/// Application state shared across all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded at startup.
    pub config: Arc<ConfigV1>,
    /// URL builder; its store is the single source of the current `AuthConfig`.
    pub urls: AuthUrlBuilder,
    /// Account endpoints of the application's backend.
    pub backend: Arc<dyn AccountBackend>,
}

impl AppState {
    pub fn new(config: Arc<ConfigV1>, backend: Arc<dyn AccountBackend>) -> Self {
        let store = AuthConfigStore::new(config.auth.clone());
        let urls = AuthUrlBuilder::with_encoding(store, config.url_encoding);
        AppState {
            config,
            urls,
            backend,
        }
    }

    pub fn auth_config(&self) -> &AuthConfigStore {
        self.urls.store()
    }
}
