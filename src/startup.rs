//! Application startup and server initialization.
//!
//! Builds the account backend and shared state from the configuration,
//! then serves the router.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use crate::backend::create_backend;
use crate::config::ConfigV1;
use crate::routes;
use crate::state::AppState;

/// Initializes and runs the application server.
///
/// # Errors
///
/// Returns an error if the account backend client cannot be built, the
/// server fails to bind to the configured address, or serving fails.
pub async fn run(config: Arc<ConfigV1>) -> Result<(), Box<dyn std::error::Error>> {
    let backend = create_backend(&config.backend, config.url_encoding)?;
    let state = AppState::new(config.clone(), backend);

    info!(
        "Identity provider at {} for app '{}' in organization '{}'",
        config.auth.server_url, config.auth.app_name, config.auth.organization_name
    );
    match &config.public_origin {
        Some(origin) => info!("Redirect URI origin fixed to {}", origin),
        None => info!("Redirect URI origin taken from each request"),
    }

    let app = routes::create_router(state);
    let listener = TcpListener::bind(&config.bind_address).await?;
    info!("Starting server on {}", config.bind_address);

    axum::serve(listener, app).await?;
    Ok(())
}
