use std::sync::{Arc, PoisonError, RwLock};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Client-side settings for talking to the identity provider.
///
/// `app_name` doubles as the OAuth `state` parameter. Nothing here is
/// validated: empty or malformed values simply produce malformed URLs.
#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone, PartialEq, Eq)]
pub struct AuthConfig {
    /// Base URL of the identity provider, e.g. `https://door.example.com`.
    #[serde(alias = "serverUrl")]
    pub server_url: String,
    /// OAuth client id registered with the provider.
    #[serde(alias = "clientId")]
    pub client_id: String,
    /// Application name, sent back as `state`.
    #[serde(alias = "appName")]
    pub app_name: String,
    /// Organization the users belong to.
    #[serde(alias = "organizationName")]
    pub organization_name: String,
}

impl Default for AuthConfig {
    /// Placeholder values used until the application installs a real config.
    fn default() -> Self {
        AuthConfig {
            server_url: "http://example.com".to_string(),
            client_id: "xxx".to_string(),
            app_name: "app-example".to_string(),
            organization_name: "org-example".to_string(),
        }
    }
}

impl AuthConfig {
    pub fn new(
        server_url: impl Into<String>,
        client_id: impl Into<String>,
        app_name: impl Into<String>,
        organization_name: impl Into<String>,
    ) -> Self {
        AuthConfig {
            server_url: server_url.into(),
            client_id: client_id.into(),
            app_name: app_name.into(),
            organization_name: organization_name.into(),
        }
    }

    /// Names of the fields that are empty. Used for warnings only.
    pub fn empty_fields(&self) -> Vec<&'static str> {
        [
            ("server_url", &self.server_url),
            ("client_id", &self.client_id),
            ("app_name", &self.app_name),
            ("organization_name", &self.organization_name),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

/// Shared slot holding the current `AuthConfig`.
///
/// Cloning the store yields another handle to the same slot, so a
/// `set_config` through any handle is seen by every reader. Readers get an
/// immutable snapshot; writers swap the whole snapshot.
#[derive(Clone, Debug)]
pub struct AuthConfigStore {
    current: Arc<RwLock<Arc<AuthConfig>>>,
}

impl Default for AuthConfigStore {
    fn default() -> Self {
        Self::new(AuthConfig::default())
    }
}

impl AuthConfigStore {
    pub fn new(config: AuthConfig) -> Self {
        warn_on_empty_fields(&config);
        AuthConfigStore {
            current: Arc::new(RwLock::new(Arc::new(config))),
        }
    }

    /// Replaces the whole configuration. Fields are never merged.
    pub fn set_config(&self, config: AuthConfig) {
        warn_on_empty_fields(&config);
        debug!(
            event_name = "auth.config.replaced",
            event_domain = "auth",
            server_url = config.server_url.as_str(),
            app_name = config.app_name.as_str(),
            organization_name = config.organization_name.as_str(),
            "auth configuration replaced"
        );
        let mut slot = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *slot = Arc::new(config);
    }

    /// Returns the configuration as of this call.
    pub fn get_config(&self) -> Arc<AuthConfig> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

fn warn_on_empty_fields(config: &AuthConfig) {
    let empty = config.empty_fields();
    if !empty.is_empty() {
        warn!(
            event_name = "auth.config.empty_fields",
            event_domain = "auth",
            fields = ?empty,
            "auth configuration has empty fields; generated URLs will be malformed"
        );
    }
}
