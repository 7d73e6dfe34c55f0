use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use huddle_core::{AppError, CallerScope};
use uuid::Uuid;

use crate::error::HttpAppError;

/// Caller resolved from a verified bearer token and stored in request extensions
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub email: Option<String>,
    pub claims: serde_json::Value,
}

impl AuthenticatedUser {
    /// Per-request scope handed to the services and stores.
    pub fn scope(&self) -> CallerScope {
        CallerScope::new(self.user_id, self.claims.clone())
    }
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = HttpAppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| HttpAppError(AppError::Unauthorized("Unauthorized".to_string())))
    }
}
