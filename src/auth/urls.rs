use std::borrow::Cow;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::config::AuthConfigStore;

const REDIRECT_PATH: &str = "/login";
const SCOPE: &str = "read";

/// How values are interpolated into generated URLs.
///
/// `Raw` reproduces the exact format identity providers have been receiving
/// so far: values are inserted verbatim. `Percent` encodes every query value
/// and path segment.
#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UrlEncoding {
    #[default]
    Raw,
    Percent,
}

impl UrlEncoding {
    pub fn apply<'a>(&self, value: &'a str) -> Cow<'a, str> {
        match self {
            UrlEncoding::Raw => Cow::Borrowed(value),
            UrlEncoding::Percent => urlencoding::encode(value),
        }
    }
}

/// Drops every trailing slash from a base URL.
///
/// `http://example.com/` and `http://example.com` both become
/// `http://example.com`. All slashes go, not just one, so that `a//`
/// normalizes to `a` and a second application changes nothing.
pub fn normalize_base_url(url: &str) -> &str {
    url.trim_end_matches('/')
}

/// Derives identity-provider URLs from the current `AuthConfig`.
///
/// Every call reads a fresh snapshot from the store, so replacements made
/// through `AuthConfigStore::set_config` show up immediately.
#[derive(Clone, Debug)]
pub struct AuthUrlBuilder {
    store: AuthConfigStore,
    encoding: UrlEncoding,
}

impl AuthUrlBuilder {
    pub fn new(store: AuthConfigStore) -> Self {
        Self::with_encoding(store, UrlEncoding::default())
    }

    pub fn with_encoding(store: AuthConfigStore, encoding: UrlEncoding) -> Self {
        AuthUrlBuilder { store, encoding }
    }

    pub fn store(&self) -> &AuthConfigStore {
        &self.store
    }

    pub fn encoding(&self) -> UrlEncoding {
        self.encoding
    }

    /// The URL that starts the login handshake.
    ///
    /// `current_origin` is the scheme, host and port the browser is on; the
    /// provider sends the user back to `{current_origin}/login`.
    pub fn build_authorize_url(&self, current_origin: &str) -> String {
        let config = self.store.get_config();
        let redirect_uri = format!("{}{}", current_origin, REDIRECT_PATH);
        let enc = self.encoding;

        format!(
            "{}/login/oauth/authorize?client_id={}&response_type=code&redirect_uri={}&scope={}&state={}",
            normalize_base_url(&config.server_url),
            enc.apply(&config.client_id),
            enc.apply(&redirect_uri),
            SCOPE,
            enc.apply(&config.app_name),
        )
    }

    pub fn build_my_profile_url(&self) -> String {
        let config = self.store.get_config();
        format!("{}/account", normalize_base_url(&config.server_url))
    }

    pub fn build_user_profile_url(&self, user_name: &str) -> String {
        let config = self.store.get_config();
        format!(
            "{}/users/{}/{}",
            normalize_base_url(&config.server_url),
            self.encoding.apply(&config.organization_name),
            self.encoding.apply(user_name),
        )
    }
}
