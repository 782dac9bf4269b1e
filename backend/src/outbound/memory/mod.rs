//! In-process adapters used when no database is configured.
//!
//! [`InMemoryStore`] implements every repository port plus the object store
//! over one mutex-guarded state, so a server started without
//! `database_url` behaves like the PostgreSQL deployment minus durability.
//! The same store backs the HTTP behaviour tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::access::invite_decision;
use crate::domain::ports::{
    AccountCredentials, AccountRepository, AccountRepositoryError, AuditLogRepository,
    AuditLogRepositoryError, MediaAssetRepository, MediaAssetRepositoryError, MessageRepository,
    MessageRepositoryError, NewAccount, ObjectStore, ObjectStoreError, RoleRepository,
    RoleRepositoryError, TicketFilter, TicketRepository, TicketRepositoryError,
};
use crate::domain::{
    AuditEntry, EmailAddress, InviteDecision, MediaAsset, MediaAssetId, Message, MessageId, Profile,
    ProfileWithRoles, Role, RoleSet, Ticket, TicketId, TicketStatus, UserId,
};

#[derive(Debug, Default)]
struct State {
    password_hashes: HashMap<UserId, String>,
    profiles: HashMap<UserId, Profile>,
    roles: HashMap<UserId, RoleSet>,
    tickets: HashMap<TicketId, Ticket>,
    messages: Vec<Message>,
    assets: Vec<MediaAsset>,
    audit: Vec<AuditEntry>,
    objects: BTreeMap<String, Vec<u8>>,
}

impl State {
    fn profile_by_email(&self, email: &str) -> Option<&Profile> {
        self.profiles
            .values()
            .find(|profile| profile.email.as_ref() == email)
    }
}

const POISONED: &str = "in-memory store lock poisoned";

/// Shared in-memory state implementing the repository ports.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock<E>(&self, connection: impl FnOnce(&'static str) -> E) -> Result<MutexGuard<'_, State>, E> {
        self.state.lock().map_err(|_| connection(POISONED))
    }

    /// Audit entries appended so far, oldest first.
    pub fn audit_entries(&self) -> Vec<AuditEntry> {
        self.state
            .lock()
            .map(|state| state.audit.clone())
            .unwrap_or_default()
    }

    /// Number of stored objects.
    pub fn object_count(&self) -> usize {
        self.state
            .lock()
            .map(|state| state.objects.len())
            .unwrap_or_default()
    }
}

fn newest_first(tickets: &mut [Ticket]) {
    tickets.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
}

#[async_trait]
impl AccountRepository for InMemoryStore {
    async fn create(&self, account: &NewAccount) -> Result<Profile, AccountRepositoryError> {
        let mut state = self.lock(AccountRepositoryError::connection)?;
        if state.profile_by_email(account.email.as_ref()).is_some() {
            return Err(AccountRepositoryError::duplicate_email(account.email.as_ref()));
        }
        let profile = Profile {
            id: account.id,
            name: account.name.clone(),
            email: account.email.clone(),
            created_at: account.created_at,
        };
        state
            .password_hashes
            .insert(account.id, account.password_hash.clone());
        state.profiles.insert(account.id, profile.clone());
        state
            .roles
            .insert(account.id, account.roles.iter().copied().collect());
        Ok(profile)
    }

    async fn delete(&self, id: &UserId) -> Result<(), AccountRepositoryError> {
        let mut state = self.lock(AccountRepositoryError::connection)?;
        state.password_hashes.remove(id);
        state.profiles.remove(id);
        state.roles.remove(id);
        Ok(())
    }

    async fn find_credentials(
        &self,
        email: &str,
    ) -> Result<Option<AccountCredentials>, AccountRepositoryError> {
        let state = self.lock(AccountRepositoryError::connection)?;
        let normalised = email.trim().to_lowercase();
        Ok(state.profile_by_email(&normalised).and_then(|profile| {
            state
                .password_hashes
                .get(&profile.id)
                .map(|hash| AccountCredentials {
                    user_id: profile.id,
                    password_hash: hash.clone(),
                })
        }))
    }

    async fn find_profile(&self, id: &UserId) -> Result<Option<Profile>, AccountRepositoryError> {
        let state = self.lock(AccountRepositoryError::connection)?;
        Ok(state.profiles.get(id).cloned())
    }

    async fn find_profile_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<Profile>, AccountRepositoryError> {
        let state = self.lock(AccountRepositoryError::connection)?;
        Ok(state.profile_by_email(email.as_ref()).cloned())
    }

    async fn list_staff(&self) -> Result<Vec<ProfileWithRoles>, AccountRepositoryError> {
        let state = self.lock(AccountRepositoryError::connection)?;
        let mut staff: Vec<ProfileWithRoles> = state
            .profiles
            .values()
            .filter_map(|profile| {
                let roles = state.roles.get(&profile.id)?;
                roles.is_staff_or_admin().then(|| ProfileWithRoles {
                    profile: profile.clone(),
                    roles: roles.clone(),
                })
            })
            .collect();
        staff.sort_by(|a, b| {
            a.profile
                .name
                .as_ref()
                .cmp(b.profile.name.as_ref())
                .then(a.profile.id.cmp(&b.profile.id))
        });
        Ok(staff)
    }
}

#[async_trait]
impl RoleRepository for InMemoryStore {
    async fn roles_for(&self, user_id: &UserId) -> Result<RoleSet, RoleRepositoryError> {
        let state = self.lock(RoleRepositoryError::connection)?;
        Ok(state.roles.get(user_id).cloned().unwrap_or_default())
    }

    async fn assign(&self, user_id: &UserId, role: Role) -> Result<bool, RoleRepositoryError> {
        let mut state = self.lock(RoleRepositoryError::connection)?;
        if !state.profiles.contains_key(user_id) {
            return Err(RoleRepositoryError::query("referenced record does not exist"));
        }
        Ok(state.roles.entry(*user_id).or_default().insert(role))
    }

    async fn has_role(&self, user_id: &UserId, role: Role) -> Result<bool, RoleRepositoryError> {
        let state = self.lock(RoleRepositoryError::connection)?;
        Ok(state
            .roles
            .get(user_id)
            .is_some_and(|roles| roles.contains(role)))
    }

    async fn can_invite_staff(&self, user_id: &UserId) -> Result<bool, RoleRepositoryError> {
        let state = self.lock(RoleRepositoryError::connection)?;
        Ok(state.roles.get(user_id).is_some_and(|roles| {
            invite_decision(roles, Role::Staff) == InviteDecision::Allowed
        }))
    }
}

#[async_trait]
impl TicketRepository for InMemoryStore {
    async fn create(
        &self,
        ticket: &Ticket,
        opening_message: Option<Message>,
    ) -> Result<(), TicketRepositoryError> {
        let mut state = self.lock(TicketRepositoryError::connection)?;
        state.tickets.insert(ticket.id, ticket.clone());
        if let Some(message) = opening_message {
            state.messages.push(message);
        }
        Ok(())
    }

    async fn find(&self, id: &TicketId) -> Result<Option<Ticket>, TicketRepositoryError> {
        let state = self.lock(TicketRepositoryError::connection)?;
        Ok(state.tickets.get(id).cloned())
    }

    async fn list(&self, filter: &TicketFilter) -> Result<Vec<Ticket>, TicketRepositoryError> {
        let state = self.lock(TicketRepositoryError::connection)?;
        let mut tickets: Vec<Ticket> = state
            .tickets
            .values()
            .filter(|ticket| filter.student_id.is_none_or(|id| ticket.student_id == id))
            .filter(|ticket| filter.status.is_none_or(|status| ticket.status == status))
            .cloned()
            .collect();
        newest_first(&mut tickets);
        Ok(tickets)
    }

    async fn update_status(
        &self,
        id: &TicketId,
        status: TicketStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Ticket>, TicketRepositoryError> {
        let mut state = self.lock(TicketRepositoryError::connection)?;
        Ok(state.tickets.get_mut(id).map(|ticket| {
            ticket.status = status;
            ticket.updated_at = updated_at;
            ticket.clone()
        }))
    }

    async fn list_created_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<Ticket>, TicketRepositoryError> {
        let state = self.lock(TicketRepositoryError::connection)?;
        let mut tickets: Vec<Ticket> = state
            .tickets
            .values()
            .filter(|ticket| ticket.created_at >= since)
            .cloned()
            .collect();
        tickets.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(tickets)
    }
}

#[async_trait]
impl MessageRepository for InMemoryStore {
    async fn insert(&self, message: &Message) -> Result<(), MessageRepositoryError> {
        let mut state = self.lock(MessageRepositoryError::connection)?;
        state.messages.push(message.clone());
        Ok(())
    }

    async fn find(&self, id: &MessageId) -> Result<Option<Message>, MessageRepositoryError> {
        let state = self.lock(MessageRepositoryError::connection)?;
        Ok(state.messages.iter().find(|message| message.id == *id).cloned())
    }

    async fn list_for_ticket(
        &self,
        ticket_id: &TicketId,
    ) -> Result<Vec<Message>, MessageRepositoryError> {
        let state = self.lock(MessageRepositoryError::connection)?;
        // Insertion order is chronological, matching `created_at` order.
        Ok(state
            .messages
            .iter()
            .filter(|message| message.ticket_id == *ticket_id)
            .cloned()
            .collect())
    }

    async fn list_created_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<Message>, MessageRepositoryError> {
        let state = self.lock(MessageRepositoryError::connection)?;
        Ok(state
            .messages
            .iter()
            .filter(|message| message.created_at >= since)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl MediaAssetRepository for InMemoryStore {
    async fn insert(&self, asset: &MediaAsset) -> Result<(), MediaAssetRepositoryError> {
        let mut state = self.lock(MediaAssetRepositoryError::connection)?;
        state.assets.push(asset.clone());
        Ok(())
    }

    async fn find(
        &self,
        id: &MediaAssetId,
    ) -> Result<Option<MediaAsset>, MediaAssetRepositoryError> {
        let state = self.lock(MediaAssetRepositoryError::connection)?;
        Ok(state.assets.iter().find(|asset| asset.id == *id).cloned())
    }

    async fn list_for_messages(
        &self,
        message_ids: &[MessageId],
    ) -> Result<Vec<MediaAsset>, MediaAssetRepositoryError> {
        let state = self.lock(MediaAssetRepositoryError::connection)?;
        Ok(state
            .assets
            .iter()
            .filter(|asset| message_ids.contains(&asset.message_id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl AuditLogRepository for InMemoryStore {
    async fn append(&self, entry: &AuditEntry) -> Result<(), AuditLogRepositoryError> {
        let mut state = self.lock(AuditLogRepositoryError::connection)?;
        state.audit.push(entry.clone());
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for InMemoryStore {
    async fn put(&self, path: &str, bytes: &[u8]) -> Result<(), ObjectStoreError> {
        let mut state = self.lock(ObjectStoreError::io)?;
        state.objects.insert(path.to_owned(), bytes.to_vec());
        Ok(())
    }

    async fn get(&self, path: &str) -> Result<Vec<u8>, ObjectStoreError> {
        let state = self.lock(ObjectStoreError::io)?;
        state
            .objects
            .get(path)
            .cloned()
            .ok_or_else(|| ObjectStoreError::not_found(path))
    }

    async fn delete(&self, path: &str) -> Result<(), ObjectStoreError> {
        let mut state = self.lock(ObjectStoreError::io)?;
        state.objects.remove(path);
        Ok(())
    }
}
