//! Account endpoints relayed to the application's backend.
//!
//! Each relay forwards the caller's own `Cookie` header and hands any
//! `Set-Cookie` from the backend back to that caller only.

use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, HeaderValue};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tracing::{info, warn};

use crate::backend::BackendReply;
use crate::state::AppState;
use crate::utils::http_helpers::HTTPError;

/// Registers account routes. `/login` is where the identity provider sends
/// the browser back to.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(login))
        .route("/api/get-account", get(get_account))
        .route("/api/get-users", get(get_users))
        .route("/api/logout", post(logout))
}

#[derive(Deserialize)]
struct LoginParams {
    code: String,
    state: String,
}

#[derive(Deserialize)]
struct UsersParams {
    owner: String,
}

fn request_cookie(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
}

/// JSON body plus the backend's `Set-Cookie` headers.
fn relay(reply: BackendReply) -> Response {
    let mut response = Json(reply.body).into_response();
    for cookie in &reply.set_cookies {
        match HeaderValue::from_str(cookie) {
            Ok(value) => {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(_) => warn!("Dropping unparseable Set-Cookie from account backend"),
        }
    }
    response
}

async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<LoginParams>,
) -> Result<Response, HTTPError> {
    let app_name = state.auth_config().get_config().app_name.clone();
    if params.state != app_name {
        warn!(
            event_name = "account.login.state_mismatch",
            event_domain = "account",
            expected = app_name.as_str(),
            received = params.state.as_str(),
            "login callback state does not match the application name"
        );
    }

    let reply = state
        .backend
        .login(&params.code, &params.state, request_cookie(&headers))
        .await?;
    info!("Login relayed for state '{}'", params.state);
    Ok(relay(reply))
}

async fn get_account(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, HTTPError> {
    let reply = state.backend.get_account(request_cookie(&headers)).await?;
    Ok(relay(reply))
}

async fn get_users(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<UsersParams>,
) -> Result<Response, HTTPError> {
    let reply = state
        .backend
        .get_users(&params.owner, request_cookie(&headers))
        .await?;
    Ok(relay(reply))
}

async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, HTTPError> {
    let reply = state.backend.logout(request_cookie(&headers)).await?;
    info!("Logout relayed");
    Ok(relay(reply))
}
