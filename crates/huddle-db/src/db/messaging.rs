use async_trait::async_trait;
use huddle_core::{
    models::{Message, MessageRow, MessageSession, SessionMembershipRow},
    AppError, CallerScope,
};
use sqlx::{PgConnection, Postgres};
use uuid::Uuid;

use super::gateway::{db_now, PgGateway};
use super::store::MessagingStore;

/// Repository for message sessions, their members and messages
#[derive(Clone)]
pub struct PgMessagingStore {
    gateway: PgGateway,
}

impl PgMessagingStore {
    pub fn new(gateway: PgGateway) -> Self {
        Self { gateway }
    }
}

async fn insert_member(
    conn: &mut PgConnection,
    session_id: Uuid,
    user_id: Uuid,
) -> Result<bool, AppError> {
    let result = sqlx::query(
        r#"
        INSERT INTO message_session_users (user_id, message_session_id)
        VALUES ($1, $2)
        ON CONFLICT (user_id, message_session_id) DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(session_id)
    .execute(conn)
    .await?;

    Ok(result.rows_affected() > 0)
}

#[async_trait]
impl MessagingStore for PgMessagingStore {
    #[tracing::instrument(skip(self, scope, members), fields(db.table = "message_session", db.operation = "insert", member_count = members.len()))]
    async fn insert_session(
        &self,
        scope: &CallerScope,
        organization_id: Uuid,
        title: &str,
        members: &[Uuid],
    ) -> Result<MessageSession, AppError> {
        let now = db_now();
        let session = MessageSession {
            id: Uuid::new_v4(),
            organization_id,
            title: title.to_string(),
            last_message_sent: None,
            created_at: now,
            updated_at: now,
        };

        let mut tx = self.gateway.begin(scope).await?;

        sqlx::query(
            r#"
            INSERT INTO message_session (id, organization_id, title, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(session.id)
        .bind(session.organization_id)
        .bind(&session.title)
        .bind(session.created_at)
        .bind(session.updated_at)
        .execute(&mut *tx)
        .await?;

        // The caller's own row goes first; the insert policy admits other
        // users only once the caller is a member.
        insert_member(&mut *tx, session.id, scope.user_id).await?;
        for user_id in members.iter().filter(|id| **id != scope.user_id) {
            insert_member(&mut *tx, session.id, *user_id).await?;
        }

        tx.commit().await?;

        tracing::info!(session_id = %session.id, "Message session created");
        Ok(session)
    }

    #[tracing::instrument(skip(self, scope), fields(db.table = "message_session_users", db.operation = "insert"))]
    async fn insert_session_member(
        &self,
        scope: &CallerScope,
        session_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, AppError> {
        let mut tx = self.gateway.begin(scope).await?;
        let inserted = insert_member(&mut *tx, session_id, user_id).await?;
        tx.commit().await?;
        Ok(inserted)
    }

    #[tracing::instrument(skip(self, scope), fields(db.table = "message_session_users", db.operation = "select"))]
    async fn is_session_member(
        &self,
        scope: &CallerScope,
        session_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, AppError> {
        let mut tx = self.gateway.begin(scope).await?;

        let exists = sqlx::query_scalar::<Postgres, bool>(
            "SELECT EXISTS(SELECT 1 FROM message_session_users WHERE message_session_id = $1 AND user_id = $2)",
        )
        .bind(session_id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(exists)
    }

    #[tracing::instrument(skip(self, scope), fields(db.table = "message_session_users", db.operation = "select"))]
    async fn list_session_memberships(
        &self,
        scope: &CallerScope,
        user_id: Uuid,
    ) -> Result<Vec<SessionMembershipRow>, AppError> {
        let mut tx = self.gateway.begin(scope).await?;

        let rows = sqlx::query_as::<Postgres, SessionMembershipRow>(
            r#"
            SELECT su.user_id,
                   su.message_session_id,
                   su.created_at,
                   su.role,
                   s.organization_id AS session_organization_id,
                   s.title AS session_title,
                   s.last_message_sent AS session_last_message_sent,
                   s.created_at AS session_created_at,
                   s.updated_at AS session_updated_at
            FROM message_session_users su
            LEFT JOIN message_session s ON s.id = su.message_session_id
            WHERE su.user_id = $1
            ORDER BY su.created_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(rows)
    }

    #[tracing::instrument(skip(self, scope, content), fields(db.table = "message", db.operation = "insert", db.record_id = %session_id))]
    async fn insert_message(
        &self,
        scope: &CallerScope,
        session_id: Uuid,
        content: &str,
    ) -> Result<Message, AppError> {
        let now = db_now();
        let message = Message {
            id: Uuid::new_v4(),
            message_session_id: session_id,
            user_id: scope.user_id,
            message: content.to_string(),
            timestamp: now,
            profile_id: None,
            profile_full_name: None,
            created_at: now,
            updated_at: now,
        };

        let mut tx = self.gateway.begin(scope).await?;

        sqlx::query(
            r#"
            INSERT INTO message (id, message_session_id, user_id, message, "timestamp", created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(message.id)
        .bind(message.message_session_id)
        .bind(message.user_id)
        .bind(&message.message)
        .bind(message.timestamp)
        .bind(message.created_at)
        .bind(message.updated_at)
        .execute(&mut *tx)
        .await?;

        // Dropping `tx` on the error path rolls the message back too
        let stamped: bool = sqlx::query_scalar("SELECT app_record_last_message($1)")
            .bind(message.id)
            .fetch_one(&mut *tx)
            .await?;
        if !stamped {
            return Err(AppError::Internal(format!(
                "Session {} was not updated with its last message",
                session_id
            )));
        }

        tx.commit().await?;
        Ok(message)
    }

    #[tracing::instrument(skip(self, scope), fields(db.table = "message", db.operation = "select", db.record_id = %session_id))]
    async fn list_messages(
        &self,
        scope: &CallerScope,
        session_id: Uuid,
    ) -> Result<Vec<MessageRow>, AppError> {
        let mut tx = self.gateway.begin(scope).await?;

        let rows = sqlx::query_as::<Postgres, MessageRow>(
            r#"
            SELECT m.id,
                   m.message_session_id,
                   m.user_id,
                   m.message,
                   m."timestamp",
                   m.created_at,
                   m.updated_at,
                   p.id AS profile_id,
                   p.full_name AS profile_full_name
            FROM message m
            LEFT JOIN profiles p ON p.id = m.user_id
            WHERE m.message_session_id = $1
            ORDER BY m."timestamp" ASC, m.created_at ASC, m.id ASC
            "#,
        )
        .bind(session_id)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(rows)
    }
}
