//! Shared application state

use huddle_db::{MessagingStore, OrganizationStore, StoreHealth};
use huddle_services::{MessagingService, OrganizationService};
use std::sync::Arc;

use crate::auth::TokenVerifier;

/// Services, the token verifier and the store health check.
///
/// Holds no per-caller data: every caller-specific value travels in the
/// request's [`AuthenticatedUser`](crate::auth::AuthenticatedUser).
#[derive(Clone)]
pub struct AppState {
    pub organizations: OrganizationService,
    pub messaging: MessagingService,
    pub store_health: Arc<dyn StoreHealth>,
    pub verifier: Arc<TokenVerifier>,
}

impl AppState {
    pub fn new(
        organization_store: Arc<dyn OrganizationStore>,
        messaging_store: Arc<dyn MessagingStore>,
        store_health: Arc<dyn StoreHealth>,
        verifier: TokenVerifier,
        require_session_membership: bool,
    ) -> Self {
        Self {
            organizations: OrganizationService::new(organization_store),
            messaging: MessagingService::new(messaging_store, require_session_membership),
            store_health,
            verifier: Arc::new(verifier),
        }
    }
}
