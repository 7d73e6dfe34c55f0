use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Chat session inside an organization
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct MessageSession {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub title: String,
    /// Body of the most recent message (last write wins)
    pub last_message_sent: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Session membership row joined with its session.
///
/// `role` is storage-internal and never part of the public shape. The
/// session columns are nullable because the join is outer.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SessionMembershipRow {
    pub user_id: Uuid,
    pub message_session_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub role: Option<String>,
    pub session_organization_id: Option<Uuid>,
    pub session_title: Option<String>,
    pub session_last_message_sent: Option<String>,
    pub session_created_at: Option<DateTime<Utc>>,
    pub session_updated_at: Option<DateTime<Utc>>,
}

/// One entry of `GET /sessions`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct SessionMembership {
    pub user_id: Uuid,
    pub message_session: Option<MessageSession>,
    pub created_at: DateTime<Utc>,
}

impl From<SessionMembershipRow> for SessionMembership {
    fn from(row: SessionMembershipRow) -> Self {
        let message_session = match (
            row.session_organization_id,
            row.session_title,
            row.session_created_at,
            row.session_updated_at,
        ) {
            (Some(organization_id), Some(title), Some(created_at), Some(updated_at)) => {
                Some(MessageSession {
                    id: row.message_session_id,
                    organization_id,
                    title,
                    last_message_sent: row.session_last_message_sent,
                    created_at,
                    updated_at,
                })
            }
            _ => None,
        };

        SessionMembership {
            user_id: row.user_id,
            message_session,
            created_at: row.created_at,
        }
    }
}

/// Message row outer-joined with the author's profile
#[derive(Debug, Clone)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct MessageRow {
    pub id: Uuid,
    pub message_session_id: Uuid,
    pub user_id: Uuid,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub profile_id: Option<Uuid>,
    pub profile_full_name: Option<String>,
}

/// Message as returned to clients
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct Message {
    pub id: Uuid,
    pub message_session_id: Uuid,
    pub user_id: Uuid,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_full_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<MessageRow> for Message {
    fn from(row: MessageRow) -> Self {
        Message {
            id: row.id,
            message_session_id: row.message_session_id,
            user_id: row.user_id,
            message: row.message,
            timestamp: row.timestamp,
            profile_id: row.profile_id,
            profile_full_name: row.profile_full_name.filter(|name| !name.is_empty()),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Request DTO for `POST /sessions`
#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    #[serde(default)]
    pub organization_id: String,
    #[serde(default)]
    #[validate(length(max = 500, message = "users must contain at most 500 entries"))]
    pub users: Vec<String>,
    #[serde(default)]
    #[validate(length(max = 255, message = "title must be at most 255 characters"))]
    pub title: String,
}

/// Request DTO for `POST /sessions/message`
#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateMessageRequest {
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    #[validate(length(max = 4000, message = "content must be at most 4000 characters"))]
    pub content: String,
}

/// Request DTO for `POST /sessions/{sessionId}/members`
#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
pub struct AddSessionMembersRequest {
    #[serde(default)]
    #[validate(length(max = 500, message = "users must contain at most 500 entries"))]
    pub users: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AddSessionMembersResponse {
    pub session_id: Uuid,
    pub added: Vec<Uuid>,
}
