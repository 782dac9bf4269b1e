//! Staff and admin invitations.
//!
//! Each outcome, accepted or rejected, appends exactly one audit entry. The
//! caller's permission comes from the role repository's `can_invite_staff`
//! predicate; inviting an admin additionally requires `has_role(admin)`.

use std::net::IpAddr;
use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::{Value, json};
use tracing::{error, info, warn};

use crate::domain::port_errors::{map_account_error, map_hasher_error, map_role_error};
use crate::domain::ports::{
    AccountRepository, AccountRepositoryError, AuditLogRepository, CredentialHasher,
    InvitationCaller, InviteStaffRequest, InvitedStaff, NewAccount, RoleRepository,
    StaffInvitation,
};
use crate::domain::{
    AuditAction, AuditEntry, EmailAddress, Error, Password, ProfileName, Role, UserId,
};

/// Implements [`StaffInvitation`].
#[derive(Clone)]
pub struct StaffInvitationService<A, R, L, H> {
    accounts: Arc<A>,
    roles: Arc<R>,
    audit: Arc<L>,
    hasher: Arc<H>,
    clock: Arc<dyn Clock>,
}

impl<A, R, L, H> StaffInvitationService<A, R, L, H> {
    pub fn new(
        accounts: Arc<A>,
        roles: Arc<R>,
        audit: Arc<L>,
        hasher: Arc<H>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            accounts,
            roles,
            audit,
            hasher,
            clock,
        }
    }
}

/// Per-request audit context.
struct Audit<'a, L: ?Sized> {
    log: &'a L,
    clock: &'a dyn Clock,
    ip_address: Option<IpAddr>,
}

impl<L> Audit<'_, L>
where
    L: AuditLogRepository + ?Sized,
{
    /// Append an entry. A failed write is logged, never surfaced.
    async fn record(&self, action: AuditAction, user_id: Option<UserId>, details: Value) {
        let mut entry = AuditEntry::new(action, details)
            .with_ip(self.ip_address)
            .at(self.clock.utc());
        if let Some(id) = user_id {
            entry = entry.with_user(id);
        }
        if let Err(err) = self.log.append(&entry).await {
            error!(action = %action, error = %err, "failed to write audit entry");
        }
    }
}

fn parse_invitable_role(raw: &str) -> Option<Role> {
    match raw.trim().parse::<Role>() {
        Ok(role @ (Role::Staff | Role::Admin)) => Some(role),
        _ => None,
    }
}

impl<A, R, L, H> StaffInvitationService<A, R, L, H>
where
    A: AccountRepository,
    R: RoleRepository,
    L: AuditLogRepository,
    H: CredentialHasher,
{
    /// Resolve the caller or explain why it could not be trusted.
    async fn authenticate(
        &self,
        audit: &Audit<'_, L>,
        caller: InvitationCaller,
    ) -> Result<UserId, Error> {
        match caller {
            InvitationCaller::Anonymous => {
                audit
                    .record(AuditAction::InviteMissingAuth, None, json!({}))
                    .await;
                Err(Error::unauthorized("authentication required"))
            }
            InvitationCaller::Unverifiable { reason } => {
                audit
                    .record(AuditAction::InviteInvalidToken, None, json!({ "reason": reason }))
                    .await;
                Err(Error::unauthorized("invalid credentials"))
            }
            InvitationCaller::User(user_id) => {
                let known = self
                    .accounts
                    .find_profile(&user_id)
                    .await
                    .map_err(map_account_error)?
                    .is_some();
                if known {
                    return Ok(user_id);
                }
                audit
                    .record(
                        AuditAction::InviteInvalidToken,
                        None,
                        json!({ "reason": "unknown user", "claimedUserId": user_id }),
                    )
                    .await;
                Err(Error::unauthorized("invalid credentials"))
            }
        }
    }

    /// Check permission, role and escalation for an authenticated caller.
    async fn authorize(
        &self,
        audit: &Audit<'_, L>,
        caller: UserId,
        requested_role: &str,
    ) -> Result<Role, Error> {
        let may_invite = self
            .roles
            .can_invite_staff(&caller)
            .await
            .map_err(map_role_error)?;
        if !may_invite {
            audit
                .record(
                    AuditAction::InviteForbidden,
                    Some(caller),
                    json!({ "requestedRole": requested_role }),
                )
                .await;
            return Err(Error::forbidden("only staff or admins may invite accounts"));
        }

        let Some(role) = parse_invitable_role(requested_role) else {
            audit
                .record(
                    AuditAction::InviteInvalidRole,
                    Some(caller),
                    json!({ "requestedRole": requested_role }),
                )
                .await;
            return Err(Error::invalid_request("role must be staff or admin")
                .with_details(json!({ "field": "role", "code": "invalid_role" })));
        };

        if role == Role::Admin {
            let is_admin = self
                .roles
                .has_role(&caller, Role::Admin)
                .await
                .map_err(map_role_error)?;
            if !is_admin {
                warn!(caller = %caller, "non-admin attempted to invite an admin");
                audit
                    .record(
                        AuditAction::InviteEscalationAttempt,
                        Some(caller),
                        json!({ "requestedRole": role }),
                    )
                    .await;
                return Err(Error::forbidden("only admins may invite admins"));
            }
        }
        Ok(role)
    }

    async fn creation_failed(
        &self,
        audit: &Audit<'_, L>,
        caller: UserId,
        email: &str,
        error: Error,
    ) -> Error {
        audit
            .record(
                AuditAction::InviteUserCreationFailed,
                Some(caller),
                json!({ "email": email, "error": error.message() }),
            )
            .await;
        error
    }

    async fn build_account(&self, request: &InviteStaffRequest) -> Result<NewAccount, Error> {
        let email = EmailAddress::new(&request.email)
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        let name =
            ProfileName::new(&request.name).map_err(|err| Error::invalid_request(err.to_string()))?;
        let password = Password::new(request.password.as_str())
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        let password_hash = self
            .hasher
            .hash(password.expose())
            .map_err(map_hasher_error)?;
        Ok(NewAccount {
            id: UserId::random(),
            email,
            name,
            password_hash,
            roles: Vec::new(),
            created_at: self.clock.utc(),
        })
    }
}

#[async_trait]
impl<A, R, L, H> StaffInvitation for StaffInvitationService<A, R, L, H>
where
    A: AccountRepository,
    R: RoleRepository,
    L: AuditLogRepository,
    H: CredentialHasher,
{
    async fn invite(
        &self,
        caller: InvitationCaller,
        request: InviteStaffRequest,
        ip_address: Option<IpAddr>,
    ) -> Result<InvitedStaff, Error> {
        let audit = Audit {
            log: self.audit.as_ref(),
            clock: self.clock.as_ref(),
            ip_address,
        };
        let caller = self.authenticate(&audit, caller).await?;
        let role = self.authorize(&audit, caller, &request.role).await?;

        let account = match self.build_account(&request).await {
            Ok(account) => account,
            Err(err) => return Err(self.creation_failed(&audit, caller, &request.email, err).await),
        };
        let profile = match self.accounts.create(&account).await {
            Ok(profile) => profile,
            Err(err) => {
                let mapped = match err {
                    AccountRepositoryError::DuplicateEmail { .. } => {
                        Error::conflict("an account with this email already exists")
                    }
                    other => map_account_error(other),
                };
                return Err(self.creation_failed(&audit, caller, &request.email, mapped).await);
            }
        };

        if let Err(err) = self.roles.assign(&profile.id, role).await {
            audit
                .record(
                    AuditAction::InviteRoleAssignmentFailed,
                    Some(caller),
                    json!({
                        "newUserId": profile.id,
                        "role": role,
                        "error": err.to_string(),
                    }),
                )
                .await;
            if let Err(cleanup) = self.accounts.delete(&profile.id).await {
                error!(user_id = %profile.id, error = %cleanup, "failed to remove partially invited account");
            }
            return Err(Error::internal("failed to assign role to the new account"));
        }

        audit
            .record(
                AuditAction::StaffInvited,
                Some(caller),
                json!({
                    "newUserId": profile.id,
                    "email": profile.email,
                    "role": role,
                }),
            )
            .await;
        info!(invited = %profile.id, role = %role, by = %caller, "account invited");
        Ok(InvitedStaff {
            user_id: profile.id,
            email: profile.email,
            name: profile.name,
            role,
        })
    }
}

#[cfg(test)]
mod tests;
