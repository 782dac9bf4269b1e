//! Idempotent seeding of the fixed demo accounts.
//!
//! Existing accounts keep their password and profile; only a missing role
//! grant is added. A concurrent run that wins the insert race is treated as
//! an existing account.

use std::net::IpAddr;
use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{error, info};

use crate::domain::port_errors::{map_account_error, map_hasher_error, map_role_error};
use crate::domain::ports::{
    AccountRepository, AccountRepositoryError, AuditLogRepository, CredentialHasher,
    DemoAccountSeeding, DemoAccountStatus, DemoSeedReport, NewAccount, RoleRepository,
    SeededAccount,
};
use crate::domain::{AuditAction, AuditEntry, EmailAddress, Error, Profile, ProfileName, Role, UserId};

/// Shared password for every demo account.
pub const DEMO_PASSWORD: &str = "DemoPass123!";

/// A demo account definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DemoAccount {
    pub email: &'static str,
    pub name: &'static str,
    pub role: Role,
}

/// The accounts ensured by [`DemoAccountSeeder`], admin first.
pub const DEMO_ACCOUNTS: [DemoAccount; 2] = [
    DemoAccount {
        email: "admin@demo.helpdesk.local",
        name: "Demo Admin",
        role: Role::Admin,
    },
    DemoAccount {
        email: "staff@demo.helpdesk.local",
        name: "Demo Staff",
        role: Role::Staff,
    },
];

/// Implements [`DemoAccountSeeding`].
#[derive(Clone)]
pub struct DemoAccountSeeder<A, R, L, H> {
    accounts: Arc<A>,
    roles: Arc<R>,
    audit: Arc<L>,
    hasher: Arc<H>,
    clock: Arc<dyn Clock>,
}

impl<A, R, L, H> DemoAccountSeeder<A, R, L, H> {
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

impl<A, R, L, H> DemoAccountSeeder<A, R, L, H>
where
    A: AccountRepository,
    R: RoleRepository,
    L: AuditLogRepository,
    H: CredentialHasher,
{
    async fn ensure(&self, demo: DemoAccount) -> Result<SeededAccount, Error> {
        let email = EmailAddress::new(demo.email)
            .map_err(|err| Error::internal(format!("invalid demo email: {err}")))?;

        if let Some(profile) = self.lookup(&email).await? {
            return self.ensure_role(profile, demo.role).await;
        }

        let name = ProfileName::new(demo.name)
            .map_err(|err| Error::internal(format!("invalid demo name: {err}")))?;
        let account = NewAccount {
            id: UserId::random(),
            email: email.clone(),
            name,
            password_hash: self.hasher.hash(DEMO_PASSWORD).map_err(map_hasher_error)?,
            roles: vec![demo.role],
            created_at: self.clock.utc(),
        };
        match self.accounts.create(&account).await {
            Ok(profile) => Ok(SeededAccount {
                user_id: profile.id,
                email: profile.email,
                role: demo.role,
                status: DemoAccountStatus::Created,
                role_added: true,
            }),
            Err(AccountRepositoryError::DuplicateEmail { .. }) => {
                let profile = self.lookup(&email).await?.ok_or_else(|| {
                    Error::internal("demo account vanished after a duplicate insert")
                })?;
                self.ensure_role(profile, demo.role).await
            }
            Err(other) => Err(map_account_error(other)),
        }
    }

    async fn lookup(&self, email: &EmailAddress) -> Result<Option<Profile>, Error> {
        self.accounts
            .find_profile_by_email(email)
            .await
            .map_err(map_account_error)
    }

    async fn ensure_role(&self, profile: Profile, role: Role) -> Result<SeededAccount, Error> {
        let role_added = self
            .roles
            .assign(&profile.id, role)
            .await
            .map_err(map_role_error)?;
        Ok(SeededAccount {
            user_id: profile.id,
            email: profile.email,
            role,
            status: DemoAccountStatus::Existing,
            role_added,
        })
    }
}

#[async_trait]
impl<A, R, L, H> DemoAccountSeeding for DemoAccountSeeder<A, R, L, H>
where
    A: AccountRepository,
    R: RoleRepository,
    L: AuditLogRepository,
    H: CredentialHasher,
{
    async fn seed(&self, ip_address: Option<IpAddr>) -> Result<DemoSeedReport, Error> {
        let mut accounts = Vec::with_capacity(DEMO_ACCOUNTS.len());
        for demo in DEMO_ACCOUNTS {
            accounts.push(self.ensure(demo).await?);
        }
        let report = DemoSeedReport { accounts };

        let created: Vec<&str> = report
            .accounts
            .iter()
            .filter(|account| account.status == DemoAccountStatus::Created)
            .map(|account| account.email.as_ref())
            .collect();
        let existing: Vec<&str> = report
            .accounts
            .iter()
            .filter(|account| account.status == DemoAccountStatus::Existing)
            .map(|account| account.email.as_ref())
            .collect();
        let entry = AuditEntry::new(
            AuditAction::DemoAccountsSeeded,
            json!({ "created": created, "existing": existing }),
        )
        .with_ip(ip_address)
        .at(self.clock.utc());
        if let Err(err) = self.audit.append(&entry).await {
            error!(error = %err, "failed to write audit entry");
        }

        info!(created = report.created(), "demo accounts ensured");
        Ok(report)
    }
}
