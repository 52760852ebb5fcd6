//! Identity-provider configuration and the URLs derived from it.

pub mod config;
pub mod urls;

pub use config::{AuthConfig, AuthConfigStore};
pub use urls::{normalize_base_url, AuthUrlBuilder, UrlEncoding};
