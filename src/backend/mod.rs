pub mod base;
pub mod http_backend;

// Re-export the primary backend items so callers can do
// "use crate::backend::{AccountBackend, create_backend};"
pub use base::{create_backend, AccountBackend, BackendConfig, BackendError, BackendReply};
pub use http_backend::HttpAccountBackend;
