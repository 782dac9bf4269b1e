//! Account signup, login and caller resolution.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{info, warn};

use crate::domain::port_errors::{map_account_error, map_hasher_error, map_role_error};
use crate::domain::ports::{AccountRepository, AuthCommand, CredentialHasher, NewAccount, RoleRepository};
use crate::domain::{
    Actor, Error, LoginCredentials, ProfileWithRoles, Role, RoleSet, SignupRequest, UserId,
};

/// Implements [`AuthCommand`] over the account and role repositories.
#[derive(Clone)]
pub struct AccountService<A, R, H> {
    accounts: Arc<A>,
    roles: Arc<R>,
    hasher: Arc<H>,
    clock: Arc<dyn Clock>,
}

impl<A, R, H> AccountService<A, R, H> {
    pub fn new(accounts: Arc<A>, roles: Arc<R>, hasher: Arc<H>, clock: Arc<dyn Clock>) -> Self {
        Self {
            accounts,
            roles,
            hasher,
            clock,
        }
    }
}

fn invalid_credentials() -> Error {
    Error::unauthorized("invalid email or password")
}

fn stale_session() -> Error {
    Error::unauthorized("session is no longer valid")
}

#[async_trait]
impl<A, R, H> AuthCommand for AccountService<A, R, H>
where
    A: AccountRepository,
    R: RoleRepository,
    H: CredentialHasher,
{
    async fn signup(&self, request: SignupRequest) -> Result<ProfileWithRoles, Error> {
        let password_hash = self
            .hasher
            .hash(request.password.expose())
            .map_err(map_hasher_error)?;
        let account = NewAccount {
            id: UserId::random(),
            email: request.email,
            name: request.name,
            password_hash,
            roles: vec![Role::Student],
            created_at: self.clock.utc(),
        };
        let profile = self
            .accounts
            .create(&account)
            .await
            .map_err(map_account_error)?;
        info!(user_id = %profile.id, "student account created");
        Ok(ProfileWithRoles {
            profile,
            roles: [Role::Student].into_iter().collect(),
        })
    }

    async fn login(&self, credentials: &LoginCredentials) -> Result<UserId, Error> {
        let Some(stored) = self
            .accounts
            .find_credentials(credentials.email())
            .await
            .map_err(map_account_error)?
        else {
            return Err(invalid_credentials());
        };

        let verified = self
            .hasher
            .verify(credentials.password(), &stored.password_hash)
            .map_err(map_hasher_error)?;
        if !verified {
            warn!(user_id = %stored.user_id, "login rejected");
            return Err(invalid_credentials());
        }
        Ok(stored.user_id)
    }

    async fn current_user(&self, user_id: &UserId) -> Result<ProfileWithRoles, Error> {
        let profile = self
            .accounts
            .find_profile(user_id)
            .await
            .map_err(map_account_error)?
            .ok_or_else(stale_session)?;
        let roles = self.roles.roles_for(user_id).await.map_err(map_role_error)?;
        Ok(ProfileWithRoles { profile, roles })
    }

    async fn resolve_actor(&self, user_id: &UserId) -> Result<Actor, Error> {
        let known = self
            .accounts
            .find_profile(user_id)
            .await
            .map_err(map_account_error)?
            .is_some();
        if !known {
            return Err(stale_session());
        }
        let roles: RoleSet = self.roles.roles_for(user_id).await.map_err(map_role_error)?;
        Ok(Actor::new(*user_id, roles))
    }
}
