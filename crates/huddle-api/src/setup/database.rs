//! Postgres gateway bootstrap
//!
//! Connects, applies the workspace migrations and refuses to start unless
//! the configured request role can be assumed and is bound by row-level
//! policies.

use anyhow::{Context, Result};
use huddle_core::Config;
use huddle_db::PgGateway;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::path::Path;
use std::time::Duration;

const IDLE_TIMEOUT: Duration = Duration::from_secs(600);
const MAX_LIFETIME: Duration = Duration::from_secs(1800);

/// Build the request-scoped gateway every store runs through
pub async fn setup_gateway(config: &Config) -> Result<PgGateway> {
    let pool = connect(config).await?;
    apply_migrations(&pool).await?;

    let gateway = PgGateway::new(pool, config.db_rls_role());
    gateway
        .verify_rls_role()
        .await
        .context("Row-level security role check failed")?;
    tracing::info!(
        role = %gateway.rls_role(),
        "Requests run under row-level security role"
    );

    Ok(gateway)
}

async fn connect(config: &Config) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections())
        .acquire_timeout(Duration::from_secs(config.db_timeout_seconds()))
        .idle_timeout(IDLE_TIMEOUT)
        .max_lifetime(MAX_LIFETIME)
        .connect(config.database_url())
        .await
        .context("Failed to connect to database")?;

    tracing::info!(
        max_connections = config.db_max_connections(),
        "Postgres pool ready"
    );
    Ok(pool)
}

async fn apply_migrations(pool: &PgPool) -> Result<()> {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../migrations");
    let migrator = Migrator::new(dir)
        .await
        .context("Failed to load migrations")?;
    migrator
        .run(pool)
        .await
        .context("Failed to apply migrations")?;

    tracing::info!(count = migrator.iter().count(), "Schema up to date");
    Ok(())
}
