use std::sync::Arc;

use huddle_core::{
    models::{Membership, MembershipRole, Organization, OrganizationMember, OrganizationMembership},
    validation::require_non_empty,
    AppError, CallerScope,
};
use huddle_db::OrganizationStore;
use uuid::Uuid;

/// Organizations and organization membership
#[derive(Clone)]
pub struct OrganizationService {
    store: Arc<dyn OrganizationStore>,
}

impl OrganizationService {
    pub fn new(store: Arc<dyn OrganizationStore>) -> Self {
        Self { store }
    }

    /// Create an organization owned by the caller.
    ///
    /// The organization row and the owner membership are written in one
    /// transaction.
    #[tracing::instrument(skip(self, scope, description), fields(user_id = %scope.user_id))]
    pub async fn create_organization(
        &self,
        scope: &CallerScope,
        name: &str,
        description: Option<&str>,
    ) -> Result<Organization, AppError> {
        let name = require_non_empty(name, "Organization name is required")?;
        let description = description.map(str::trim).unwrap_or_default();

        self.store
            .insert_organization(scope, name, description)
            .await
    }

    /// Join an organization as the caller.
    ///
    /// Re-joining updates the role of the existing membership. `owner` is only
    /// ever assigned at creation, and `admin` may only be taken by a caller
    /// who already is owner or admin.
    #[tracing::instrument(skip(self, scope), fields(user_id = %scope.user_id))]
    pub async fn join_organization(
        &self,
        scope: &CallerScope,
        organization_id: Uuid,
        role: Option<MembershipRole>,
    ) -> Result<Membership, AppError> {
        let role = role.unwrap_or_default();

        match role {
            MembershipRole::Owner => {
                return Err(AppError::InvalidInput(
                    "role 'owner' is assigned only when creating an organization".to_string(),
                ));
            }
            MembershipRole::Admin => {
                let current = self
                    .find_membership(scope, organization_id, scope.user_id)
                    .await?;
                if !current.is_some_and(|m| m.role.can_grant_admin()) {
                    return Err(AppError::Forbidden(
                        "Only owners and admins may hold the admin role".to_string(),
                    ));
                }
            }
            MembershipRole::Member => {}
        }

        self.store
            .upsert_membership(scope, organization_id, scope.user_id, role)
            .await
    }

    pub async fn find_membership(
        &self,
        scope: &CallerScope,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Membership>, AppError> {
        self.store
            .find_membership(scope, organization_id, user_id)
            .await
    }

    #[tracing::instrument(skip(self, scope), fields(user_id = %scope.user_id))]
    pub async fn list_organizations_for_user(
        &self,
        scope: &CallerScope,
    ) -> Result<Vec<OrganizationMembership>, AppError> {
        let rows = self
            .store
            .list_memberships_for_user(scope, scope.user_id)
            .await?;
        Ok(rows.into_iter().map(OrganizationMembership::from).collect())
    }

    /// Members of an organization the caller belongs to
    #[tracing::instrument(skip(self, scope), fields(user_id = %scope.user_id))]
    pub async fn list_members(
        &self,
        scope: &CallerScope,
        organization_id: Uuid,
    ) -> Result<Vec<OrganizationMember>, AppError> {
        if self
            .store
            .find_membership(scope, organization_id, scope.user_id)
            .await?
            .is_none()
        {
            return Err(AppError::Forbidden(
                "Not a member of this organization".to_string(),
            ));
        }

        let rows = self.store.list_members(scope, organization_id).await?;
        Ok(rows.into_iter().map(OrganizationMember::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use huddle_db::test_helpers::MockStore;

    fn service() -> (OrganizationService, MockStore) {
        let store = MockStore::new();
        (OrganizationService::new(Arc::new(store.clone())), store)
    }

    #[tokio::test]
    async fn test_create_organization_assigns_owner() {
        let (service, store) = service();
        let scope = CallerScope::for_user(Uuid::new_v4());

        let organization = service
            .create_organization(&scope, "  Cleanup Crew ", Some("volunteers"))
            .await
            .unwrap();

        assert_eq!(organization.name, "Cleanup Crew");
        assert_eq!(organization.description, "volunteers");
        let memberships = store.memberships_of(organization.id);
        assert_eq!(memberships.len(), 1);
        assert_eq!(memberships[0].user_id, scope.user_id);
        assert_eq!(memberships[0].role, MembershipRole::Owner);
    }

    #[tokio::test]
    async fn test_create_organization_rejects_blank_name() {
        let (service, store) = service();
        let scope = CallerScope::for_user(Uuid::new_v4());

        let err = service
            .create_organization(&scope, "   ", None)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::InvalidInput(ref m) if m == "Organization name is required"));
        assert_eq!(store.organization_count(), 0);
    }

    #[tokio::test]
    async fn test_description_defaults_to_empty() {
        let (service, _) = service();
        let scope = CallerScope::for_user(Uuid::new_v4());

        let organization = service
            .create_organization(&scope, "Crew", None)
            .await
            .unwrap();
        assert_eq!(organization.description, "");
    }

    #[tokio::test]
    async fn test_join_is_idempotent() {
        let (service, store) = service();
        let owner = CallerScope::for_user(Uuid::new_v4());
        let joiner = CallerScope::for_user(Uuid::new_v4());
        let organization = service
            .create_organization(&owner, "Crew", None)
            .await
            .unwrap();

        for _ in 0..3 {
            let membership = service
                .join_organization(&joiner, organization.id, None)
                .await
                .unwrap();
            assert_eq!(membership.role, MembershipRole::Member);
        }

        let joiner_rows = store
            .memberships_of(organization.id)
            .into_iter()
            .filter(|m| m.user_id == joiner.user_id)
            .count();
        assert_eq!(joiner_rows, 1);
    }

    #[tokio::test]
    async fn test_join_as_owner_rejected() {
        let (service, _) = service();
        let owner = CallerScope::for_user(Uuid::new_v4());
        let organization = service
            .create_organization(&owner, "Crew", None)
            .await
            .unwrap();

        let err = service
            .join_organization(
                &CallerScope::for_user(Uuid::new_v4()),
                organization.id,
                Some(MembershipRole::Owner),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_admin_requires_elevated_membership() {
        let (service, _) = service();
        let owner = CallerScope::for_user(Uuid::new_v4());
        let member = CallerScope::for_user(Uuid::new_v4());
        let organization = service
            .create_organization(&owner, "Crew", None)
            .await
            .unwrap();
        service
            .join_organization(&member, organization.id, None)
            .await
            .unwrap();

        let err = service
            .join_organization(&member, organization.id, Some(MembershipRole::Admin))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        let membership = service
            .join_organization(&owner, organization.id, Some(MembershipRole::Admin))
            .await
            .unwrap();
        assert_eq!(membership.role, MembershipRole::Admin);
    }

    #[tokio::test]
    async fn test_join_unknown_organization_is_persistence_error() {
        let (service, _) = service();
        let scope = CallerScope::for_user(Uuid::new_v4());

        let err = service
            .join_organization(&scope, Uuid::new_v4(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
    }

    #[tokio::test]
    async fn test_list_organizations_and_members() {
        let (service, store) = service();
        let owner = CallerScope::for_user(Uuid::new_v4());
        let joiner = CallerScope::for_user(Uuid::new_v4());
        store.add_profile(owner.user_id, Some("Ada Lovelace"));

        let organization = service
            .create_organization(&owner, "Crew", Some("volunteers"))
            .await
            .unwrap();
        service
            .join_organization(&joiner, organization.id, None)
            .await
            .unwrap();

        let organizations = service.list_organizations_for_user(&joiner).await.unwrap();
        assert_eq!(organizations.len(), 1);
        let summary = organizations[0].organization.as_ref().unwrap();
        assert_eq!(summary.name, "Crew");
        assert_eq!(summary.description.as_deref(), Some("volunteers"));

        let members = service.list_members(&owner, organization.id).await.unwrap();
        assert_eq!(members.len(), 2);
        let owner_entry = members.iter().find(|m| m.user_id == owner.user_id).unwrap();
        assert_eq!(owner_entry.profile_full_name.as_deref(), Some("Ada Lovelace"));
        let joiner_entry = members.iter().find(|m| m.user_id == joiner.user_id).unwrap();
        assert!(joiner_entry.profile_id.is_none());
    }

    #[tokio::test]
    async fn test_outsider_cannot_list_members() {
        let (service, _) = service();
        let owner = CallerScope::for_user(Uuid::new_v4());
        let organization = service
            .create_organization(&owner, "Crew", None)
            .await
            .unwrap();

        let err = service
            .list_members(&CallerScope::for_user(Uuid::new_v4()), organization.id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_list_organizations_empty() {
        let (service, _) = service();
        let scope = CallerScope::for_user(Uuid::new_v4());
        assert!(service
            .list_organizations_for_user(&scope)
            .await
            .unwrap()
            .is_empty());
    }
}
