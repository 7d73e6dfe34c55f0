use axum::{response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::AuthenticatedUser;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthTestResponse {
    #[serde(rename = "Success")]
    pub success: String,
}

/// Confirm the bearer token is accepted
#[utoipa::path(
    get,
    path = "/auth/test",
    responses(
        (status = 200, description = "Token accepted", body = AuthTestResponse),
        (status = 401, description = "Missing or invalid token", body = crate::error::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
#[tracing::instrument(skip(user), fields(user_id = %user.user_id))]
pub async fn auth_test(user: AuthenticatedUser) -> impl IntoResponse {
    Json(AuthTestResponse {
        success: "Path Worked".to_string(),
    })
}
