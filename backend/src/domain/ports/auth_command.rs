//! Driving port for account signup, login and caller resolution.
//!
//! Inbound adapters authenticate through this port without knowing how
//! accounts or hashes are stored.

use async_trait::async_trait;

use crate::domain::{Actor, Error, LoginCredentials, ProfileWithRoles, SignupRequest, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthCommand: Send + Sync {
    /// Create a student account.
    async fn signup(&self, request: SignupRequest) -> Result<ProfileWithRoles, Error>;

    /// Validate credentials and return the authenticated user id.
    async fn login(&self, credentials: &LoginCredentials) -> Result<UserId, Error>;

    /// Profile and roles of the signed-in user.
    async fn current_user(&self, user_id: &UserId) -> Result<ProfileWithRoles, Error>;

    /// Resolve a session user id into an [`Actor`].
    ///
    /// Unknown ids are `unauthorized`; the account may have been removed
    /// after the session was issued.
    async fn resolve_actor(&self, user_id: &UserId) -> Result<Actor, Error>;
}
