//! HTTP route definitions and handlers.
//!
//! Routes are grouped into identity-provider redirects and configuration
//! (`auth_routes`), account calls relayed to the backend (`account_routes`),
//! and the health check.

mod account_routes;
mod auth_routes;

use crate::state::AppState;
use axum::{routing::get, Router};

/// Creates the application router with all configured routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(auth_routes::routes())
        .merge(account_routes::routes())
        .route("/health", get(|| async { "OK" }))
        .with_state(state)
}
