use std::sync::Arc;

use futures::future::try_join_all;
use huddle_core::{
    models::{Message, MessageSession, SessionMembership},
    validation::{normalize_member_ids, require_non_empty},
    AppError, CallerScope,
};
use huddle_db::MessagingStore;
use uuid::Uuid;

/// Message sessions, session membership and messages
#[derive(Clone)]
pub struct MessagingService {
    store: Arc<dyn MessagingStore>,
    require_session_membership: bool,
}

impl MessagingService {
    pub fn new(store: Arc<dyn MessagingStore>, require_session_membership: bool) -> Self {
        Self {
            store,
            require_session_membership,
        }
    }

    /// Create a session whose members are `users` plus the caller.
    ///
    /// Blank entries are dropped and duplicates collapse. The session and the
    /// whole member set are written in one transaction.
    #[tracing::instrument(skip(self, scope, users), fields(user_id = %scope.user_id))]
    pub async fn create_session(
        &self,
        scope: &CallerScope,
        organization_id: Uuid,
        title: &str,
        users: &[String],
    ) -> Result<MessageSession, AppError> {
        let title = require_non_empty(title, "title is required")?;
        let members = normalize_member_ids(users, scope.user_id)?;

        let session = self
            .store
            .insert_session(scope, organization_id, title, &members)
            .await?;

        tracing::debug!(session_id = %session.id, members = members.len(), "Session created");
        Ok(session)
    }

    /// Add one user to a session. Adding an existing member is a no-op and
    /// returns `false`.
    pub async fn add_member(
        &self,
        scope: &CallerScope,
        session_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, AppError> {
        self.store
            .insert_session_member(scope, session_id, user_id)
            .await
    }

    /// Add several users to a session the caller belongs to.
    ///
    /// Inserts run concurrently and the call fails if any of them fails.
    /// Returns the ids that were not members before.
    #[tracing::instrument(skip(self, scope, users), fields(user_id = %scope.user_id))]
    pub async fn add_members(
        &self,
        scope: &CallerScope,
        session_id: Uuid,
        users: &[String],
    ) -> Result<Vec<Uuid>, AppError> {
        let ids = normalize_member_ids(users, scope.user_id)?;

        if !self
            .store
            .is_session_member(scope, session_id, scope.user_id)
            .await?
        {
            return Err(AppError::Forbidden(
                "Only session members may add members".to_string(),
            ));
        }

        let inserted = try_join_all(
            ids.iter()
                .map(|user_id| self.add_member(scope, session_id, *user_id)),
        )
        .await?;

        Ok(ids
            .into_iter()
            .zip(inserted)
            .filter_map(|(id, added)| added.then_some(id))
            .collect())
    }

    #[tracing::instrument(skip(self, scope), fields(user_id = %scope.user_id))]
    pub async fn list_sessions_for_user(
        &self,
        scope: &CallerScope,
    ) -> Result<Vec<SessionMembership>, AppError> {
        let rows = self
            .store
            .list_session_memberships(scope, scope.user_id)
            .await?;
        Ok(rows.into_iter().map(SessionMembership::from).collect())
    }

    /// Post a message as the caller and make it the session's last message.
    #[tracing::instrument(skip(self, scope, content), fields(user_id = %scope.user_id))]
    pub async fn create_message(
        &self,
        scope: &CallerScope,
        session_id: Uuid,
        content: &str,
    ) -> Result<Message, AppError> {
        let content = require_non_empty(content, "content is required")?;

        if self.require_session_membership
            && !self
                .store
                .is_session_member(scope, session_id, scope.user_id)
                .await?
        {
            return Err(AppError::Forbidden(
                "Not a member of this session".to_string(),
            ));
        }

        self.store.insert_message(scope, session_id, content).await
    }

    /// Messages of a session, oldest first.
    ///
    /// Reading always requires membership, whatever the posting rule is.
    #[tracing::instrument(skip(self, scope), fields(user_id = %scope.user_id))]
    pub async fn list_messages(
        &self,
        scope: &CallerScope,
        session_id: Uuid,
    ) -> Result<Vec<Message>, AppError> {
        if !self
            .store
            .is_session_member(scope, session_id, scope.user_id)
            .await?
        {
            return Err(AppError::Forbidden(
                "Not a member of this session".to_string(),
            ));
        }

        let rows = self.store.list_messages(scope, session_id).await?;
        Ok(rows.into_iter().map(Message::from).collect())
    }
}
