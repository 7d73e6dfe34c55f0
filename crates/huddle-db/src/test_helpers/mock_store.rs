//! In-memory store implementation for testing
//!
//! Mirrors the Postgres stores: composite keys are unique, multi-row writes
//! are all-or-nothing, and foreign keys are checked.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use huddle_core::{
    models::{
        Membership, MembershipRole, Message, MessageRow, MessageSession, Organization,
        OrganizationMemberRow, OrganizationMembershipRow, SessionMembershipRow,
    },
    AppError, CallerScope,
};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

use crate::db::{MessagingStore, OrganizationStore, StoreHealth};

#[derive(Default)]
struct State {
    profiles: HashMap<Uuid, Option<String>>,
    organizations: HashMap<Uuid, Organization>,
    // Insertion order preserved, keyed by (organization_id, user_id)
    memberships: Vec<(Membership, DateTime<Utc>)>,
    sessions: HashMap<Uuid, MessageSession>,
    session_members: Vec<(Uuid, Uuid, DateTime<Utc>)>,
    messages: Vec<Message>,
    failing_members: HashSet<Uuid>,
    unavailable: bool,
}

/// Mock store for testing without a database
#[derive(Clone, Default)]
pub struct MockStore {
    state: Arc<Mutex<State>>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn add_profile(&self, user_id: Uuid, full_name: Option<&str>) {
        self.state()
            .profiles
            .insert(user_id, full_name.map(str::to_string));
    }

    /// Make every write that would add `user_id` to a session fail.
    pub fn fail_session_member(&self, user_id: Uuid) {
        self.state().failing_members.insert(user_id);
    }

    /// Make every operation fail as if the database were unreachable.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.state().unavailable = unavailable;
    }

    pub fn organization_count(&self) -> usize {
        self.state().organizations.len()
    }

    pub fn session_count(&self) -> usize {
        self.state().sessions.len()
    }

    pub fn message_count(&self) -> usize {
        self.state().messages.len()
    }

    pub fn session(&self, session_id: Uuid) -> Option<MessageSession> {
        self.state().sessions.get(&session_id).cloned()
    }

    pub fn memberships_of(&self, organization_id: Uuid) -> Vec<Membership> {
        self.state()
            .memberships
            .iter()
            .filter(|(m, _)| m.organization_id == organization_id)
            .map(|(m, _)| m.clone())
            .collect()
    }

    pub fn session_member_ids(&self, session_id: Uuid) -> HashSet<Uuid> {
        self.state()
            .session_members
            .iter()
            .filter(|(_, sid, _)| *sid == session_id)
            .map(|(uid, _, _)| *uid)
            .collect()
    }
}

fn unavailable() -> AppError {
    AppError::Internal("mock store unavailable".to_string())
}

fn foreign_key_violation(table: &str) -> AppError {
    AppError::Internal(format!("foreign key violation on {}", table))
}

impl State {
    fn check_available(&self) -> Result<(), AppError> {
        if self.unavailable {
            return Err(unavailable());
        }
        Ok(())
    }

    fn is_session_member(&self, session_id: Uuid, user_id: Uuid) -> bool {
        self.session_members
            .iter()
            .any(|(uid, sid, _)| *uid == user_id && *sid == session_id)
    }

    fn add_session_member(&mut self, session_id: Uuid, user_id: Uuid) -> Result<bool, AppError> {
        if self.failing_members.contains(&user_id) {
            return Err(AppError::Internal(format!(
                "injected failure adding {} to session",
                user_id
            )));
        }
        if !self.sessions.contains_key(&session_id) {
            return Err(foreign_key_violation("message_session_users"));
        }
        if self.is_session_member(session_id, user_id) {
            return Ok(false);
        }
        self.session_members.push((user_id, session_id, Utc::now()));
        Ok(true)
    }
}

#[async_trait]
impl OrganizationStore for MockStore {
    async fn insert_organization(
        &self,
        scope: &CallerScope,
        name: &str,
        description: &str,
    ) -> Result<Organization, AppError> {
        let mut state = self.state();
        state.check_available()?;

        let organization = Organization {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: description.to_string(),
            created_at: Utc::now(),
        };
        state
            .organizations
            .insert(organization.id, organization.clone());
        state.memberships.push((
            Membership {
                organization_id: organization.id,
                user_id: scope.user_id,
                role: MembershipRole::Owner,
            },
            Utc::now(),
        ));
        Ok(organization)
    }

    async fn upsert_membership(
        &self,
        _scope: &CallerScope,
        organization_id: Uuid,
        user_id: Uuid,
        role: MembershipRole,
    ) -> Result<Membership, AppError> {
        let mut state = self.state();
        state.check_available()?;

        if !state.organizations.contains_key(&organization_id) {
            return Err(foreign_key_violation("organization_members"));
        }

        if let Some((existing, _)) = state
            .memberships
            .iter_mut()
            .find(|(m, _)| m.organization_id == organization_id && m.user_id == user_id)
        {
            existing.role = role;
            return Ok(existing.clone());
        }

        let membership = Membership {
            organization_id,
            user_id,
            role,
        };
        state.memberships.push((membership.clone(), Utc::now()));
        Ok(membership)
    }

    async fn find_membership(
        &self,
        _scope: &CallerScope,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Membership>, AppError> {
        let state = self.state();
        state.check_available()?;
        Ok(state
            .memberships
            .iter()
            .find(|(m, _)| m.organization_id == organization_id && m.user_id == user_id)
            .map(|(m, _)| m.clone()))
    }

    async fn list_memberships_for_user(
        &self,
        _scope: &CallerScope,
        user_id: Uuid,
    ) -> Result<Vec<OrganizationMembershipRow>, AppError> {
        let state = self.state();
        state.check_available()?;
        Ok(state
            .memberships
            .iter()
            .filter(|(m, _)| m.user_id == user_id)
            .map(|(m, _)| {
                let organization = state.organizations.get(&m.organization_id);
                OrganizationMembershipRow {
                    organization_id: m.organization_id,
                    role: m.role,
                    organization_name: organization.map(|o| o.name.clone()),
                    organization_description: organization.map(|o| o.description.clone()),
                }
            })
            .collect())
    }

    async fn list_members(
        &self,
        _scope: &CallerScope,
        organization_id: Uuid,
    ) -> Result<Vec<OrganizationMemberRow>, AppError> {
        let state = self.state();
        state.check_available()?;
        Ok(state
            .memberships
            .iter()
            .filter(|(m, _)| m.organization_id == organization_id)
            .map(|(m, _)| {
                let profile = state.profiles.get(&m.user_id);
                OrganizationMemberRow {
                    user_id: m.user_id,
                    role: m.role,
                    profile_id: profile.map(|_| m.user_id),
                    profile_full_name: profile.cloned().flatten(),
                }
            })
            .collect())
    }
}

#[async_trait]
impl MessagingStore for MockStore {
    async fn insert_session(
        &self,
        scope: &CallerScope,
        organization_id: Uuid,
        title: &str,
        members: &[Uuid],
    ) -> Result<MessageSession, AppError> {
        let mut state = self.state();
        state.check_available()?;

        if !state.organizations.contains_key(&organization_id) {
            return Err(foreign_key_violation("message_session"));
        }

        let mut all_members = vec![scope.user_id];
        all_members.extend(members.iter().copied().filter(|id| *id != scope.user_id));

        // Nothing is written when any member insert would fail
        if let Some(failing) = all_members
            .iter()
            .find(|id| state.failing_members.contains(*id))
        {
            return Err(AppError::Internal(format!(
                "injected failure adding {} to session",
                failing
            )));
        }

        let now = Utc::now();
        let session = MessageSession {
            id: Uuid::new_v4(),
            organization_id,
            title: title.to_string(),
            last_message_sent: None,
            created_at: now,
            updated_at: now,
        };
        state.sessions.insert(session.id, session.clone());
        for user_id in all_members {
            state.add_session_member(session.id, user_id)?;
        }
        Ok(session)
    }

    async fn insert_session_member(
        &self,
        _scope: &CallerScope,
        session_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, AppError> {
        let mut state = self.state();
        state.check_available()?;
        state.add_session_member(session_id, user_id)
    }

    async fn is_session_member(
        &self,
        _scope: &CallerScope,
        session_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, AppError> {
        let state = self.state();
        state.check_available()?;
        Ok(state.is_session_member(session_id, user_id))
    }

    async fn list_session_memberships(
        &self,
        _scope: &CallerScope,
        user_id: Uuid,
    ) -> Result<Vec<SessionMembershipRow>, AppError> {
        let state = self.state();
        state.check_available()?;
        Ok(state
            .session_members
            .iter()
            .filter(|(uid, _, _)| *uid == user_id)
            .map(|(uid, sid, created_at)| {
                let session = state.sessions.get(sid);
                SessionMembershipRow {
                    user_id: *uid,
                    message_session_id: *sid,
                    created_at: *created_at,
                    role: Some("member".to_string()),
                    session_organization_id: session.map(|s| s.organization_id),
                    session_title: session.map(|s| s.title.clone()),
                    session_last_message_sent: session.and_then(|s| s.last_message_sent.clone()),
                    session_created_at: session.map(|s| s.created_at),
                    session_updated_at: session.map(|s| s.updated_at),
                }
            })
            .collect())
    }

    async fn insert_message(
        &self,
        scope: &CallerScope,
        session_id: Uuid,
        content: &str,
    ) -> Result<Message, AppError> {
        let mut state = self.state();
        state.check_available()?;

        let now = Utc::now();
        let session = state
            .sessions
            .get_mut(&session_id)
            .ok_or_else(|| foreign_key_violation("message"))?;
        session.last_message_sent = Some(content.to_string());
        session.updated_at = now;

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
        state.messages.push(message.clone());
        Ok(message)
    }

    async fn list_messages(
        &self,
        _scope: &CallerScope,
        session_id: Uuid,
    ) -> Result<Vec<MessageRow>, AppError> {
        let state = self.state();
        state.check_available()?;

        let mut rows: Vec<MessageRow> = state
            .messages
            .iter()
            .filter(|m| m.message_session_id == session_id)
            .map(|m| {
                let profile = state.profiles.get(&m.user_id);
                MessageRow {
                    id: m.id,
                    message_session_id: m.message_session_id,
                    user_id: m.user_id,
                    message: m.message.clone(),
                    timestamp: m.timestamp,
                    created_at: m.created_at,
                    updated_at: m.updated_at,
                    profile_id: profile.map(|_| m.user_id),
                    profile_full_name: profile.cloned().flatten(),
                }
            })
            .collect();
        rows.sort_by_key(|row| row.timestamp);
        Ok(rows)
    }
}

#[async_trait]
impl StoreHealth for MockStore {
    async fn ping(&self) -> Result<(), AppError> {
        self.state().check_available()
    }
}
