//! Message session handlers

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Json},
};
use std::sync::Arc;

use crate::auth::AuthenticatedUser;
use crate::error::{HttpAppError, ValidatedJson};
use crate::state::AppState;
use huddle_core::models::{
    AddSessionMembersRequest, AddSessionMembersResponse, CreateMessageRequest,
    CreateSessionRequest, Message, MessageSession, SessionMembership,
};
use huddle_core::validation::parse_uuid_field;

/// Create a session in an organization
///
/// The caller is always a member; `users` are added alongside.
#[utoipa::path(
    post,
    path = "/sessions",
    request_body = CreateSessionRequest,
    responses(
        (status = 200, description = "Session created", body = MessageSession),
        (status = 400, description = "Invalid organization id, title or users", body = crate::error::ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = crate::error::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::error::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "sessions"
)]
#[tracing::instrument(skip(state, user, request), fields(user_id = %user.user_id))]
pub async fn create_session(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    ValidatedJson(request): ValidatedJson<CreateSessionRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let organization_id = parse_uuid_field(&request.organization_id, "organizationId")?;

    let session = state
        .messaging
        .create_session(&user.scope(), organization_id, &request.title, &request.users)
        .await?;

    tracing::info!(session_id = %session.id, "Session created");
    Ok(Json(session))
}

/// List the sessions the caller belongs to
#[utoipa::path(
    get,
    path = "/sessions",
    responses(
        (status = 200, description = "Session memberships of the caller", body = Vec<SessionMembership>),
        (status = 401, description = "Missing or invalid token", body = crate::error::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::error::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "sessions"
)]
#[tracing::instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn list_sessions(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, HttpAppError> {
    let sessions = state.messaging.list_sessions_for_user(&user.scope()).await?;
    Ok(Json(sessions))
}

/// Post a message to a session
#[utoipa::path(
    post,
    path = "/sessions/message",
    request_body = CreateMessageRequest,
    responses(
        (status = 200, description = "Message stored", body = Message),
        (status = 400, description = "Invalid session id or empty content", body = crate::error::ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = crate::error::ErrorResponse),
        (status = 403, description = "Caller is not a session member", body = crate::error::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::error::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "sessions"
)]
#[tracing::instrument(skip(state, user, request), fields(user_id = %user.user_id))]
pub async fn create_message(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    ValidatedJson(request): ValidatedJson<CreateMessageRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let session_id = parse_uuid_field(&request.session_id, "sessionId")?;

    let message = state
        .messaging
        .create_message(&user.scope(), session_id, &request.content)
        .await?;

    Ok(Json(message))
}

/// Messages of a session, oldest first
#[utoipa::path(
    get,
    path = "/sessions/{sessionId}",
    params(
        ("sessionId" = String, Path, description = "Session id")
    ),
    responses(
        (status = 200, description = "Messages of the session", body = Vec<Message>),
        (status = 400, description = "Invalid session id", body = crate::error::ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = crate::error::ErrorResponse),
        (status = 403, description = "Caller is not a session member", body = crate::error::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::error::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "sessions"
)]
#[tracing::instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn list_messages(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let session_id = parse_uuid_field(&session_id, "sessionId")?;
    let messages = state
        .messaging
        .list_messages(&user.scope(), session_id)
        .await?;
    Ok(Json(messages))
}

/// Add users to a session the caller belongs to
#[utoipa::path(
    post,
    path = "/sessions/{sessionId}/members",
    params(
        ("sessionId" = String, Path, description = "Session id")
    ),
    request_body = AddSessionMembersRequest,
    responses(
        (status = 200, description = "Ids that were added", body = AddSessionMembersResponse),
        (status = 400, description = "Invalid session id or users", body = crate::error::ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = crate::error::ErrorResponse),
        (status = 403, description = "Caller is not a session member", body = crate::error::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::error::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "sessions"
)]
#[tracing::instrument(skip(state, user, request), fields(user_id = %user.user_id))]
pub async fn add_session_members(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(session_id): Path<String>,
    ValidatedJson(request): ValidatedJson<AddSessionMembersRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let session_id = parse_uuid_field(&session_id, "sessionId")?;

    let added = state
        .messaging
        .add_members(&user.scope(), session_id, &request.users)
        .await?;

    Ok(Json(AddSessionMembersResponse { session_id, added }))
}
