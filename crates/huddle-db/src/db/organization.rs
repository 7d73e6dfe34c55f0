use async_trait::async_trait;
use huddle_core::{
    models::{
        Membership, MembershipRole, Organization, OrganizationMemberRow,
        OrganizationMembershipRow,
    },
    AppError, CallerScope,
};
use sqlx::Postgres;
use uuid::Uuid;

use super::gateway::{db_now, PgGateway};
use super::store::OrganizationStore;

/// Repository for organizations and organization memberships
#[derive(Clone)]
pub struct PgOrganizationStore {
    gateway: PgGateway,
}

impl PgOrganizationStore {
    pub fn new(gateway: PgGateway) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl OrganizationStore for PgOrganizationStore {
    // The row is not read back: the select policy only admits members, and
    // the owner membership does not exist yet at insert time.
    #[tracing::instrument(skip(self, scope), fields(db.table = "organization", db.operation = "insert", user_id = %scope.user_id))]
    async fn insert_organization(
        &self,
        scope: &CallerScope,
        name: &str,
        description: &str,
    ) -> Result<Organization, AppError> {
        let organization = Organization {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: description.to_string(),
            created_at: db_now(),
        };

        let mut tx = self.gateway.begin(scope).await?;

        sqlx::query(
            "INSERT INTO organization (id, name, description, created_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(organization.id)
        .bind(&organization.name)
        .bind(&organization.description)
        .bind(organization.created_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO organization_members (organization_id, user_id, role) VALUES ($1, $2, $3)",
        )
        .bind(organization.id)
        .bind(scope.user_id)
        .bind(MembershipRole::Owner)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(organization_id = %organization.id, "Organization created with owner");
        Ok(organization)
    }

    #[tracing::instrument(skip(self, scope), fields(db.table = "organization_members", db.operation = "upsert"))]
    async fn upsert_membership(
        &self,
        scope: &CallerScope,
        organization_id: Uuid,
        user_id: Uuid,
        role: MembershipRole,
    ) -> Result<Membership, AppError> {
        let mut tx = self.gateway.begin(scope).await?;

        let membership = sqlx::query_as::<Postgres, Membership>(
            r#"
            INSERT INTO organization_members (organization_id, user_id, role)
            VALUES ($1, $2, $3)
            ON CONFLICT (organization_id, user_id) DO UPDATE SET role = EXCLUDED.role
            RETURNING organization_id, user_id, role
            "#,
        )
        .bind(organization_id)
        .bind(user_id)
        .bind(role)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(membership)
    }

    #[tracing::instrument(skip(self, scope), fields(db.table = "organization_members", db.operation = "select"))]
    async fn find_membership(
        &self,
        scope: &CallerScope,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Membership>, AppError> {
        let mut tx = self.gateway.begin(scope).await?;

        let membership = sqlx::query_as::<Postgres, Membership>(
            "SELECT organization_id, user_id, role FROM organization_members WHERE organization_id = $1 AND user_id = $2",
        )
        .bind(organization_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(membership)
    }

    #[tracing::instrument(skip(self, scope), fields(db.table = "organization_members", db.operation = "select"))]
    async fn list_memberships_for_user(
        &self,
        scope: &CallerScope,
        user_id: Uuid,
    ) -> Result<Vec<OrganizationMembershipRow>, AppError> {
        let mut tx = self.gateway.begin(scope).await?;

        let rows = sqlx::query_as::<Postgres, OrganizationMembershipRow>(
            r#"
            SELECT m.organization_id,
                   m.role,
                   o.name AS organization_name,
                   o.description AS organization_description
            FROM organization_members m
            LEFT JOIN organization o ON o.id = m.organization_id
            WHERE m.user_id = $1
            ORDER BY m.created_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(rows)
    }

    #[tracing::instrument(skip(self, scope), fields(db.table = "organization_members", db.operation = "select", db.record_id = %organization_id))]
    async fn list_members(
        &self,
        scope: &CallerScope,
        organization_id: Uuid,
    ) -> Result<Vec<OrganizationMemberRow>, AppError> {
        let mut tx = self.gateway.begin(scope).await?;

        let rows = sqlx::query_as::<Postgres, OrganizationMemberRow>(
            r#"
            SELECT m.user_id,
                   m.role,
                   p.id AS profile_id,
                   p.full_name AS profile_full_name
            FROM organization_members m
            LEFT JOIN profiles p ON p.id = m.user_id
            WHERE m.organization_id = $1
            ORDER BY m.created_at ASC
            "#,
        )
        .bind(organization_id)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(rows)
    }
}
