use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::backend::BackendError;

/// A general purpose HTTP error type that can be converted into an `IntoResponse`.
#[derive(Debug)]
pub struct HTTPError {
    status: StatusCode,
    message: String,
}

impl HTTPError {
    /// Creates a new HTTP error with the given status code and message.
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        HTTPError {
            status,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

/// Converts our `HTTPError` into a JSON `{"error": ...}` response.
impl IntoResponse for HTTPError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

/// Upstream statuses are passed through; transport and decoding problems are
/// reported as a bad gateway.
impl From<BackendError> for HTTPError {
    fn from(err: BackendError) -> Self {
        let status = match &err {
            BackendError::Status { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            BackendError::Request(_) | BackendError::Decode(_) => StatusCode::BAD_GATEWAY,
        };
        HTTPError::new(status, err.to_string())
    }
}

/// `303 See Other` to `url`. URLs are built from unescaped values, so one
/// that cannot be a header value becomes a 400 instead of a panic.
pub fn redirect_to(url: &str) -> Result<Response, HTTPError> {
    let location = HeaderValue::from_str(url).map_err(|_| {
        HTTPError::new(
            StatusCode::BAD_REQUEST,
            "Redirect target is not a valid header value",
        )
    })?;
    Ok((StatusCode::SEE_OTHER, [(header::LOCATION, location)]).into_response())
}

/// Works out the origin (scheme, host, port) the browser used to reach us.
///
/// A configured public origin wins. Otherwise the `Origin` header is used,
/// then the first `X-Forwarded-Proto` entry (default `http`) combined with `Host`.
pub fn resolve_origin(headers: &HeaderMap, public_origin: Option<&str>) -> Option<String> {
    if let Some(origin) = public_origin.filter(|o| !o.is_empty()) {
        return Some(origin.trim_end_matches('/').to_string());
    }

    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty() && *value != "null")
    };

    if let Some(origin) = header("origin") {
        return Some(origin.to_string());
    }

    let host = header("host")?;
    // proxy chains append their own scheme: "https, http"
    let scheme = header("x-forwarded-proto")
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or("http");
    Some(format!("{}://{}", scheme, host))
}
