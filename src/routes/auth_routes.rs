//! Identity-provider redirects and auth configuration endpoints.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::auth::AuthConfig;
use crate::state::AppState;
use crate::utils::http_helpers::{redirect_to, resolve_origin, HTTPError};

/// Registers identity-provider routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/authorize", get(authorize))
        .route("/auth/urls", get(urls))
        .route("/auth/my-profile", get(my_profile))
        .route("/auth/users/:user_name", get(user_profile))
        .route("/auth/config", get(get_config).put(put_config))
}

fn request_origin(state: &AppState, headers: &HeaderMap) -> Result<String, HTTPError> {
    resolve_origin(headers, state.config.public_origin.as_deref()).ok_or_else(|| {
        HTTPError::new(
            StatusCode::BAD_REQUEST,
            "Unable to determine the request origin",
        )
    })
}

/// Sends the browser to the identity provider's authorization endpoint.
async fn authorize(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, HTTPError> {
    let origin = request_origin(&state, &headers)?;
    let url = state.urls.build_authorize_url(&origin);
    debug!("Redirecting to authorization endpoint: {}", url);
    redirect_to(&url)
}

/// Returns the URLs a UI needs to render login and profile links.
async fn urls(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, HTTPError> {
    let origin = request_origin(&state, &headers)?;
    Ok(Json(json!({
        "authorize_url": state.urls.build_authorize_url(&origin),
        "my_profile_url": state.urls.build_my_profile_url(),
    })))
}

async fn my_profile(State(state): State<AppState>) -> Result<Response, HTTPError> {
    redirect_to(&state.urls.build_my_profile_url())
}

async fn user_profile(
    State(state): State<AppState>,
    Path(user_name): Path<String>,
) -> Result<Response, HTTPError> {
    redirect_to(&state.urls.build_user_profile_url(&user_name))
}

async fn get_config(State(state): State<AppState>) -> Json<AuthConfig> {
    Json((*state.auth_config().get_config()).clone())
}

/// Replaces the auth configuration wholesale, if the deployment allows it.
async fn put_config(
    State(state): State<AppState>,
    Json(config): Json<AuthConfig>,
) -> Result<impl IntoResponse, HTTPError> {
    if !state.config.allow_config_updates {
        warn!(
            event_name = "auth.config.update_rejected",
            event_domain = "auth",
            "rejected auth configuration update; allow_config_updates is off"
        );
        return Err(HTTPError::new(
            StatusCode::FORBIDDEN,
            "Auth configuration updates are disabled",
        ));
    }

    info!(
        "Replacing auth configuration (server_url={}, app_name={})",
        config.server_url, config.app_name
    );
    state.auth_config().set_config(config);
    Ok(StatusCode::NO_CONTENT)
}
