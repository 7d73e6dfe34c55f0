use async_trait::async_trait;
use huddle_core::{
    models::{
        Membership, MembershipRole, Message, MessageRow, MessageSession, Organization,
        OrganizationMemberRow, OrganizationMembershipRow, SessionMembershipRow,
    },
    AppError, CallerScope,
};
use uuid::Uuid;

/// Organizations and their memberships
#[async_trait]
pub trait OrganizationStore: Send + Sync {
    /// Insert an organization and make the caller its owner, atomically.
    async fn insert_organization(
        &self,
        scope: &CallerScope,
        name: &str,
        description: &str,
    ) -> Result<Organization, AppError>;

    /// Insert a membership, or update its role when the pair already exists.
    async fn upsert_membership(
        &self,
        scope: &CallerScope,
        organization_id: Uuid,
        user_id: Uuid,
        role: MembershipRole,
    ) -> Result<Membership, AppError>;

    async fn find_membership(
        &self,
        scope: &CallerScope,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Membership>, AppError>;

    async fn list_memberships_for_user(
        &self,
        scope: &CallerScope,
        user_id: Uuid,
    ) -> Result<Vec<OrganizationMembershipRow>, AppError>;

    async fn list_members(
        &self,
        scope: &CallerScope,
        organization_id: Uuid,
    ) -> Result<Vec<OrganizationMemberRow>, AppError>;
}

/// Sessions, session membership and messages
#[async_trait]
pub trait MessagingStore: Send + Sync {
    /// Insert a session together with its member set, atomically.
    async fn insert_session(
        &self,
        scope: &CallerScope,
        organization_id: Uuid,
        title: &str,
        members: &[Uuid],
    ) -> Result<MessageSession, AppError>;

    /// Insert-or-no-op on (user_id, message_session_id). Returns whether a row was added.
    async fn insert_session_member(
        &self,
        scope: &CallerScope,
        session_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, AppError>;

    async fn is_session_member(
        &self,
        scope: &CallerScope,
        session_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, AppError>;

    async fn list_session_memberships(
        &self,
        scope: &CallerScope,
        user_id: Uuid,
    ) -> Result<Vec<SessionMembershipRow>, AppError>;

    /// Insert a message and overwrite the session's `last_message_sent`, atomically.
    async fn insert_message(
        &self,
        scope: &CallerScope,
        session_id: Uuid,
        content: &str,
    ) -> Result<Message, AppError>;

    /// Messages of a session in ascending timestamp order.
    async fn list_messages(
        &self,
        scope: &CallerScope,
        session_id: Uuid,
    ) -> Result<Vec<MessageRow>, AppError>;
}

/// Liveness check for the backing store
#[async_trait]
pub trait StoreHealth: Send + Sync {
    async fn ping(&self) -> Result<(), AppError>;
}
