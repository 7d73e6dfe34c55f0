use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use huddle_core::AppError;
use std::sync::Arc;

use crate::error::HttpAppError;
use crate::state::AppState;

/// Resolve the bearer token into an [`AuthenticatedUser`](super::AuthenticatedUser).
///
/// Requests without a valid token are answered with 401 before any handler
/// (and therefore any store call) runs.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = match request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
    {
        Some(h) => h,
        None => {
            return HttpAppError(AppError::Unauthorized(
                "Missing authorization header".to_string(),
            ))
            .into_response();
        }
    };

    let Some(token) = bearer_token(auth_header) else {
        return HttpAppError(AppError::Unauthorized(
            "Invalid authorization header format".to_string(),
        ))
        .into_response();
    };

    let user = match state.verifier.verify(token) {
        Ok(user) => user,
        Err(e) => return HttpAppError(e).into_response(),
    };

    tracing::debug!(user_id = %user.user_id, "Request authenticated");
    request.extensions_mut().insert(user);

    next.run(request).await
}

/// Token from a `Bearer <token>` header. The scheme is case-insensitive.
fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim_start().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
