use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::error::AppError;

/// Role held by a user inside an organization
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "membership_role", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum MembershipRole {
    Owner,
    Admin,
    #[default]
    Member,
}

impl MembershipRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MembershipRole::Owner => "owner",
            MembershipRole::Admin => "admin",
            MembershipRole::Member => "member",
        }
    }

    /// Owners and admins may grant the admin role to others.
    pub fn can_grant_admin(&self) -> bool {
        matches!(self, MembershipRole::Owner | MembershipRole::Admin)
    }
}

impl fmt::Display for MembershipRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MembershipRole {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "owner" => Ok(MembershipRole::Owner),
            "admin" => Ok(MembershipRole::Admin),
            "member" => Ok(MembershipRole::Member),
            other => Err(AppError::InvalidInput(format!(
                "role must be one of owner, admin, member (got '{}')",
                other
            ))),
        }
    }
}

/// Organization entity
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Organization {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// Membership of a user in an organization, keyed by (organization_id, user_id)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Membership {
    pub organization_id: Uuid,
    pub user_id: Uuid,
    pub role: MembershipRole,
}

/// Name and description embedded in a membership listing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct OrganizationSummary {
    pub name: String,
    pub description: Option<String>,
}

/// Membership row joined with its organization.
///
/// The organization columns are nullable because the join is outer: the
/// organization may be invisible to the caller under row-level policies.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct OrganizationMembershipRow {
    pub organization_id: Uuid,
    pub role: MembershipRole,
    pub organization_name: Option<String>,
    pub organization_description: Option<String>,
}

/// One entry of `GET /organization`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct OrganizationMembership {
    pub organization_id: Uuid,
    pub role: MembershipRole,
    pub organization: Option<OrganizationSummary>,
}

impl From<OrganizationMembershipRow> for OrganizationMembership {
    fn from(row: OrganizationMembershipRow) -> Self {
        let organization = row.organization_name.map(|name| OrganizationSummary {
            name,
            description: row.organization_description,
        });
        OrganizationMembership {
            organization_id: row.organization_id,
            role: row.role,
            organization,
        }
    }
}

/// Organization member row outer-joined with the member's profile
#[derive(Debug, Clone)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct OrganizationMemberRow {
    pub user_id: Uuid,
    pub role: MembershipRole,
    pub profile_id: Option<Uuid>,
    pub profile_full_name: Option<String>,
}

/// One entry of `GET /organization/{organizationId}/users`.
///
/// Profile fields are omitted from the JSON when no profile is resolvable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct OrganizationMember {
    pub user_id: Uuid,
    pub role: MembershipRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_full_name: Option<String>,
}

impl From<OrganizationMemberRow> for OrganizationMember {
    fn from(row: OrganizationMemberRow) -> Self {
        OrganizationMember {
            user_id: row.user_id,
            role: row.role,
            profile_id: row.profile_id,
            profile_full_name: row.profile_full_name.filter(|name| !name.is_empty()),
        }
    }
}

/// Request DTO for `POST /organization`
#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
pub struct CreateOrganizationRequest {
    #[serde(default)]
    #[validate(length(max = 255, message = "Organization name must be at most 255 characters"))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateOrganizationResponse {
    pub id: Uuid,
}

/// Request DTO for `POST /organization/member`
#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct JoinOrganizationRequest {
    #[serde(default)]
    pub organization_id: String,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrganizationsResponse {
    pub organizations: Vec<OrganizationMembership>,
}
