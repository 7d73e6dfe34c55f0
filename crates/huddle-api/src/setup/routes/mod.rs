//! Route configuration and setup.
//!
//! Health checks live in [health](health).

mod health;

use crate::auth::middleware::auth_middleware;
use crate::handlers;
use crate::state::AppState;
use axum::{
    http::{HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use huddle_core::Config;
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

const HTTP_CONCURRENCY_LIMIT: usize = 10_000;

/// Setup all application routes
pub async fn setup_routes(
    config: &Config,
    state: Arc<AppState>,
) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;

    let protected_routes = protected_routes().layer(axum::middleware::from_fn_with_state(
        state.clone(),
        auth_middleware,
    ));

    let app = public_routes(state.clone())
        .merge(protected_routes)
        .layer(ConcurrencyLimitLayer::new(HTTP_CONCURRENCY_LIMIT))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [Method::GET, Method::POST, Method::OPTIONS];

    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| {
                o.parse::<HeaderValue>()
                    .map_err(|e| anyhow::anyhow!("Invalid CORS origin '{}': {}", o, e))
            })
            .collect::<Result<Vec<_>, _>>()?;
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    };
    Ok(cors)
}

fn public_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(handlers::root::index))
        .route(
            "/health",
            get({
                let state = state.clone();
                move || async { health::health_check(state).await }
            }),
        )
        .route(
            "/api/openapi.json",
            get(|| async { Json(crate::api_doc::openapi_document()) }),
        )
}

fn protected_routes() -> Router<Arc<AppState>> {
    Router::new()
        .merge(auth_routes())
        .merge(organization_routes())
        .merge(session_routes())
}

fn auth_routes() -> Router<Arc<AppState>> {
    Router::new().route("/auth/test", get(handlers::auth::auth_test))
}

fn organization_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/organization",
            post(handlers::organizations::create_organization)
                .get(handlers::organizations::list_organizations),
        )
        .route(
            "/organization/member",
            post(handlers::organizations::join_organization),
        )
        .route(
            "/organization/{organizationId}/users",
            get(handlers::organizations::list_organization_users),
        )
}

fn session_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/sessions",
            post(handlers::sessions::create_session).get(handlers::sessions::list_sessions),
        )
        .route("/sessions/message", post(handlers::sessions::create_message))
        .route("/sessions/{sessionId}", get(handlers::sessions::list_messages))
        .route(
            "/sessions/{sessionId}/members",
            post(handlers::sessions::add_session_members),
        )
}
