#![allow(dead_code)]

use std::sync::Arc;

use authlink::backend::create_backend;
use authlink::config::{extract_config, ConfigV1};
use authlink::routes::create_router;
use authlink::state::AppState;
use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, Response};
use figment::{
    providers::{Format, Yaml},
    Figment,
};
use serde_json::Value;

pub const TEST_CONFIG: &str = r#"
version: "1.0.0"
bind_address: 127.0.0.1:8081
allow_config_updates: true
auth:
  server_url: http://example.com/
  client_id: abc
  app_name: app1
  organization_name: org1
backend:
  server_url: http://127.0.0.1:1
logging:
  level: debug
  format: json
"#;

/// Parses `TEST_CONFIG` with the backend pointed at `backend_url`.
pub fn load_test_config(backend_url: &str) -> ConfigV1 {
    let mut config = extract_config(&Figment::new().merge(Yaml::string(TEST_CONFIG)))
        .expect("Failed to parse test config YAML");
    config.backend.server_url = backend_url.to_string();
    config
}

pub fn build_app(config: ConfigV1) -> (axum::Router, AppState) {
    let config = Arc::new(config);
    let backend =
        create_backend(&config.backend, config.url_encoding).expect("backend should build");
    let state = AppState::new(config, backend);
    (create_router(state.clone()), state)
}

pub fn request(method: Method, path: &str, headers: &[(&str, &str)], body: Body) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(path);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    builder.body(body).expect("failed to build request")
}

pub fn get(path: &str, headers: &[(&str, &str)]) -> Request<Body> {
    request(Method::GET, path, headers, Body::empty())
}

pub fn location(response: &Response<Body>) -> String {
    response
        .headers()
        .get("location")
        .expect("Location header missing")
        .to_str()
        .expect("Location header not valid UTF-8")
        .to_string()
}

pub async fn json_body(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    serde_json::from_slice(&bytes).expect("body should be JSON")
}
