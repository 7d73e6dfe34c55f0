//! Application setup and initialization
//!
//! Wiring lives here rather than in main.rs so integration tests can build
//! the same router over other stores.

pub mod database;
pub mod routes;
pub mod server;

use crate::auth::TokenVerifier;
use crate::state::AppState;
use anyhow::{Context, Result};
use huddle_core::Config;
use huddle_db::{PgMessagingStore, PgOrganizationStore};
use std::sync::Arc;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    crate::telemetry::init_telemetry(config.log_format())
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!(
        environment = %config.environment(),
        require_session_membership = config.require_session_membership(),
        "Configuration loaded"
    );

    let gateway = database::setup_gateway(&config)
        .await
        .context("Database setup failed")?;

    let state = Arc::new(AppState::new(
        Arc::new(PgOrganizationStore::new(gateway.clone())),
        Arc::new(PgMessagingStore::new(gateway.clone())),
        Arc::new(gateway),
        TokenVerifier::new(config.jwt_secret(), config.jwt_audience()),
        config.require_session_membership(),
    ));

    let router = routes::setup_routes(&config, state.clone()).await?;

    Ok((state, router))
}
