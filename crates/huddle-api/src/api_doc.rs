//! OpenAPI documentation served at `/api/openapi.json`.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::error;
use crate::handlers;
use huddle_core::models;

pub fn openapi_document() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

/// Registers the `bearer_auth` scheme referenced by protected paths.
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Huddle API",
        version = "0.1.0",
        description = "Organizations, message sessions and messages. Protected endpoints expect an HS256 bearer token issued by the identity provider."
    ),
    paths(
        handlers::root::index,
        handlers::auth::auth_test,
        // Organizations
        handlers::organizations::create_organization,
        handlers::organizations::join_organization,
        handlers::organizations::list_organizations,
        handlers::organizations::list_organization_users,
        // Sessions
        handlers::sessions::create_session,
        handlers::sessions::list_sessions,
        handlers::sessions::create_message,
        handlers::sessions::list_messages,
        handlers::sessions::add_session_members,
    ),
    components(
        schemas(
            models::MembershipRole,
            models::Membership,
            models::OrganizationSummary,
            models::OrganizationMembership,
            models::OrganizationMember,
            models::CreateOrganizationRequest,
            models::CreateOrganizationResponse,
            models::JoinOrganizationRequest,
            models::OrganizationsResponse,
            models::MessageSession,
            models::SessionMembership,
            models::Message,
            models::CreateSessionRequest,
            models::CreateMessageRequest,
            models::AddSessionMembersRequest,
            models::AddSessionMembersResponse,
            handlers::auth::AuthTestResponse,
            error::ErrorResponse,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "system", description = "Reachability"),
        (name = "auth", description = "Token checks"),
        (name = "organizations", description = "Organizations and membership"),
        (name = "sessions", description = "Message sessions and messages"),
    )
)]
pub struct ApiDoc;
