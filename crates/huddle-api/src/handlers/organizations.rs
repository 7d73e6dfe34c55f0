//! Organization handlers
//!
//! Create organizations, join them and list memberships. Every call runs
//! under the caller's scope so row-level policies in the database apply.

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Json},
};
use std::sync::Arc;

use crate::auth::AuthenticatedUser;
use crate::error::{HttpAppError, ValidatedJson};
use crate::state::AppState;
use huddle_core::models::{
    CreateOrganizationRequest, CreateOrganizationResponse, JoinOrganizationRequest, Membership,
    MembershipRole, OrganizationMember, OrganizationsResponse,
};
use huddle_core::validation::parse_uuid_field;

/// Create an organization owned by the caller
#[utoipa::path(
    post,
    path = "/organization",
    request_body = CreateOrganizationRequest,
    responses(
        (status = 200, description = "Organization created", body = CreateOrganizationResponse),
        (status = 400, description = "Name missing or too long", body = crate::error::ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = crate::error::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::error::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "organizations"
)]
#[tracing::instrument(skip(state, user, request), fields(user_id = %user.user_id))]
pub async fn create_organization(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    ValidatedJson(request): ValidatedJson<CreateOrganizationRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let organization = state
        .organizations
        .create_organization(&user.scope(), &request.name, request.description.as_deref())
        .await?;

    tracing::info!(organization_id = %organization.id, "Organization created");
    Ok(Json(CreateOrganizationResponse {
        id: organization.id,
    }))
}

/// Join an organization as the caller
///
/// `role` defaults to `member`. Re-joining updates the existing role.
#[utoipa::path(
    post,
    path = "/organization/member",
    request_body = JoinOrganizationRequest,
    responses(
        (status = 200, description = "Membership created or updated", body = Membership),
        (status = 400, description = "Invalid organization id or role", body = crate::error::ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = crate::error::ErrorResponse),
        (status = 403, description = "Role not allowed for caller", body = crate::error::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::error::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "organizations"
)]
#[tracing::instrument(skip(state, user, request), fields(user_id = %user.user_id))]
pub async fn join_organization(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    ValidatedJson(request): ValidatedJson<JoinOrganizationRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let organization_id = parse_uuid_field(&request.organization_id, "organizationId")?;
    let role = request
        .role
        .as_deref()
        .filter(|r| !r.trim().is_empty())
        .map(str::parse::<MembershipRole>)
        .transpose()?;

    let membership = state
        .organizations
        .join_organization(&user.scope(), organization_id, role)
        .await?;

    Ok(Json(membership))
}

/// List the caller's organization memberships
#[utoipa::path(
    get,
    path = "/organization",
    responses(
        (status = 200, description = "Memberships of the caller", body = OrganizationsResponse),
        (status = 401, description = "Missing or invalid token", body = crate::error::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::error::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "organizations"
)]
#[tracing::instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn list_organizations(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, HttpAppError> {
    let organizations = state
        .organizations
        .list_organizations_for_user(&user.scope())
        .await?;

    Ok(Json(OrganizationsResponse { organizations }))
}

/// List the members of an organization with their profiles
#[utoipa::path(
    get,
    path = "/organization/{organizationId}/users",
    params(
        ("organizationId" = String, Path, description = "Organization id")
    ),
    responses(
        (status = 200, description = "Members of the organization", body = Vec<OrganizationMember>),
        (status = 400, description = "Invalid organization id", body = crate::error::ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = crate::error::ErrorResponse),
        (status = 403, description = "Caller is not a member of the organization", body = crate::error::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::error::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "organizations"
)]
#[tracing::instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn list_organization_users(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(organization_id): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let organization_id = parse_uuid_field(&organization_id, "organizationId")?;

    let members = state
        .organizations
        .list_members(&user.scope(), organization_id)
        .await?;

    Ok(Json(members))
}
