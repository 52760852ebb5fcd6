use figment::providers::{Env, Format, Yaml};
use figment::Figment;
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};

use super::logging::LoggingConfig;
use crate::auth::{AuthConfig, UrlEncoding};
use crate::backend::BackendConfig;

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "AUTHLINK_CONFIG";
/// Config file used when `AUTHLINK_CONFIG` is unset.
pub const DEFAULT_CONFIG_PATH: &str = "./config.yaml";
/// Prefix of environment overrides, e.g. `AUTHLINK_AUTH__CLIENT_ID`.
pub const ENV_PREFIX: &str = "AUTHLINK_";

/// A top-level enum for versioned configurations.
#[derive(Deserialize, Serialize, JsonSchema)]
#[serde(tag = "version")]
pub enum Config {
    #[serde(rename = "1.0.0")]
    ConfigV1(ConfigV1),
}

/// Main config for v1.0.0.
#[derive(Deserialize, Serialize, Debug, JsonSchema, Clone)]
pub struct ConfigV1 {
    pub bind_address: String,
    /// Origin used for the OAuth redirect URI. Taken from the request when unset.
    #[serde(default)]
    pub public_origin: Option<String>,
    /// Whether `PUT /auth/config` may replace the auth configuration.
    #[serde(default)]
    pub allow_config_updates: bool,
    #[serde(default)]
    pub url_encoding: UrlEncoding,
    /// Identity-provider settings; placeholder values when omitted.
    #[serde(default)]
    pub auth: AuthConfig,
    pub backend: BackendConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// YAML file first, then `AUTHLINK_*` environment overrides on top.
pub fn config_figment(path: &str) -> Figment {
    Figment::new().merge(Yaml::file(path)).merge(
        Env::prefixed(ENV_PREFIX)
            .ignore(&["config"])
            .split("__"),
    )
}

/// Extracts and unwraps the versioned config from a figment.
pub fn extract_config(figment: &Figment) -> Result<ConfigV1, figment::Error> {
    match figment.extract::<Config>()? {
        Config::ConfigV1(c) => Ok(c),
    }
    // handle configuration migration between versions here when necessary
}

/// Load config from `$AUTHLINK_CONFIG`, or `./config.yaml` in the current directory.
pub fn load_config() -> Result<ConfigV1, figment::Error> {
    let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    extract_config(&config_figment(&path))
}

/// JSON schema for the configuration.
pub fn config_schema() -> Result<String, serde_json::Error> {
    let schema = schema_for!(Config);
    serde_json::to_string_pretty(&schema)
}
