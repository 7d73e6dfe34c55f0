//! Health check handler and response type.

use crate::state::AppState;
use axum::{http::StatusCode, response::IntoResponse, Json};
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

const CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// Run an async check with timeout; returns status string "healthy", "timeout", or "{prefix}: {error}".
async fn run_check<F, E>(timeout: Duration, f: F, error_prefix: &str) -> String
where
    F: Future<Output = Result<(), E>>,
    E: Display,
{
    match tokio::time::timeout(timeout, f).await {
        Ok(Ok(())) => "healthy".to_string(),
        Ok(Err(e)) => format!("{}: {}", error_prefix, e),
        Err(_) => "timeout".to_string(),
    }
}

#[derive(serde::Serialize)]
pub(super) struct HealthCheckResponse {
    pub status: String,
    pub database: String,
}

/// Database reachability. 503 when the check fails or times out.
pub async fn health_check(state: Arc<AppState>) -> impl IntoResponse {
    let database = run_check(CHECK_TIMEOUT, state.store_health.ping(), "unhealthy").await;

    let (status_code, status) = if database == "healthy" {
        (StatusCode::OK, "healthy")
    } else {
        tracing::error!(database = %database, "Database health check failed");
        (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
    };

    (
        status_code,
        Json(HealthCheckResponse {
            status: status.to_string(),
            database,
        }),
    )
}
