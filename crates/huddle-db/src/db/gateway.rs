//! Request-scoped database access
//!
//! The pool is shared, but no connection is ever used outside a transaction
//! that first publishes the caller's claims with `set_config(.., true)` and
//! then drops to the row-level-security role with `SET LOCAL ROLE`. Both
//! settings are transaction-local, so they vanish on commit or rollback and
//! never leak to the next borrower of the connection.

use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use huddle_core::{AppError, CallerScope};
use sqlx::{PgPool, Postgres, Transaction};

use super::store::StoreHealth;

#[derive(Clone)]
pub struct PgGateway {
    pool: PgPool,
    rls_role: String,
}

impl PgGateway {
    pub fn new(pool: PgPool, rls_role: impl Into<String>) -> Self {
        Self {
            pool,
            rls_role: rls_role.into(),
        }
    }

    pub fn rls_role(&self) -> &str {
        &self.rls_role
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Open a transaction scoped to `scope`.
    #[tracing::instrument(skip(self, scope), fields(user_id = %scope.user_id))]
    pub async fn begin(
        &self,
        scope: &CallerScope,
    ) -> Result<Transaction<'static, Postgres>, AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT set_config('request.jwt.claims', $1, true)")
            .bind(scope.claims.to_string())
            .execute(&mut *tx)
            .await?;

        let statement = format!("SET LOCAL ROLE {}", quote_identifier(&self.rls_role));
        sqlx::query(&statement).execute(&mut *tx).await?;

        Ok(tx)
    }

    /// Check that the connection user can assume the request role and that
    /// the role is actually subject to row-level policies.
    pub async fn verify_rls_role(&self) -> Result<(), AppError> {
        let row: Option<(bool, bool, bool)> = sqlx::query_as(
            r#"
            SELECT r.rolsuper,
                   r.rolbypassrls,
                   pg_has_role(current_user, r.oid, 'MEMBER')
            FROM pg_roles r
            WHERE r.rolname = $1
            "#,
        )
        .bind(&self.rls_role)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            None => Err(AppError::Internal(format!(
                "Row-level security role '{}' does not exist",
                self.rls_role
            ))),
            Some((true, _, _)) | Some((_, true, _)) => Err(AppError::Internal(format!(
                "Role '{}' bypasses row-level security",
                self.rls_role
            ))),
            Some((_, _, false)) => Err(AppError::Internal(format!(
                "Connection user cannot assume role '{}'",
                self.rls_role
            ))),
            Some(_) => Ok(()),
        }
    }
}

#[async_trait]
impl StoreHealth for PgGateway {
    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

fn quote_identifier(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Current time at the precision Postgres stores for `timestamptz`.
pub(crate) fn db_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}
