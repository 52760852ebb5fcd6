use std::sync::Arc;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::info;

use super::http_backend::HttpAccountBackend;
use crate::auth::UrlEncoding;

/// Where the account backend lives.
#[derive(Deserialize, Serialize, Debug, JsonSchema, Clone)]
pub struct BackendConfig {
    /// Base URL of the application's backend, e.g. `http://localhost:8000`.
    #[serde(alias = "serverUrl")]
    pub server_url: String,
}

/// Failures of a single backend call. Nothing is retried.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Account backend request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Account backend answered with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Account backend returned invalid JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

/// A backend answer: the decoded JSON body plus any `Set-Cookie` values the
/// backend sent, which belong to the caller that made the request.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendReply {
    pub body: Value,
    pub set_cookies: Vec<String>,
}

/// The account endpoints of the application's backend.
///
/// Calls are credentialed per caller: `cookie` is the caller's own `Cookie`
/// header and is forwarded as-is. The backend holds no session of its own.
#[async_trait]
pub trait AccountBackend: Send + Sync {
    /// `GET /api/get-account`
    async fn get_account(&self, cookie: Option<&str>) -> Result<BackendReply, BackendError>;
    /// `GET /api/get-users?owner={owner}`
    async fn get_users(
        &self,
        owner: &str,
        cookie: Option<&str>,
    ) -> Result<BackendReply, BackendError>;
    /// `GET /api/login?code={code}&state={state}`
    async fn login(
        &self,
        code: &str,
        state: &str,
        cookie: Option<&str>,
    ) -> Result<BackendReply, BackendError>;
    /// `POST /api/logout`
    async fn logout(&self, cookie: Option<&str>) -> Result<BackendReply, BackendError>;
}

/// Builds the HTTP account backend from config.
pub fn create_backend(
    config: &BackendConfig,
    encoding: UrlEncoding,
) -> Result<Arc<dyn AccountBackend>, BackendError> {
    let backend = HttpAccountBackend::new(config, encoding)?;
    info!(
        "Using account backend at {} (url encoding: {:?})",
        backend.base_url(),
        encoding
    );
    Ok(Arc::new(backend))
}
