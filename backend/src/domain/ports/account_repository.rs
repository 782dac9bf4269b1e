//! Port for account and profile persistence.
//!
//! An account owns the credential hash; its profile shares the same id and
//! is created alongside it. Roles listed on [`NewAccount`] are granted in the
//! same unit of work so a freshly signed-up student is never role-less.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{EmailAddress, Profile, ProfileName, ProfileWithRoles, Role, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by account repository adapters.
    pub enum AccountRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "account repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "account repository query failed: {message}",
        /// Another account already uses the email address.
        DuplicateEmail { email: String } => "an account already exists for {email}",
    }
}

/// Account to be created together with its profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub id: UserId,
    pub email: EmailAddress,
    pub name: ProfileName,
    pub password_hash: String,
    pub roles: Vec<Role>,
    pub created_at: DateTime<Utc>,
}

/// Stored credential material for a login attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountCredentials {
    pub user_id: UserId,
    pub password_hash: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Create the account, its profile and the listed roles atomically.
    async fn create(&self, account: &NewAccount) -> Result<Profile, AccountRepositoryError>;

    /// Remove an account; its profile and roles cascade.
    async fn delete(&self, id: &UserId) -> Result<(), AccountRepositoryError>;

    /// Look up the credential hash for a normalised email.
    async fn find_credentials(
        &self,
        email: &str,
    ) -> Result<Option<AccountCredentials>, AccountRepositoryError>;

    async fn find_profile(&self, id: &UserId) -> Result<Option<Profile>, AccountRepositoryError>;

    async fn find_profile_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<Profile>, AccountRepositoryError>;

    /// Profiles holding the staff or admin role, ordered by name.
    async fn list_staff(&self) -> Result<Vec<ProfileWithRoles>, AccountRepositoryError>;
}

/// Fixture implementation for tests that never touch accounts.
///
/// Lookups find nothing and writes fail with a connection error.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAccountRepository;

#[async_trait]
impl AccountRepository for FixtureAccountRepository {
    async fn create(&self, _account: &NewAccount) -> Result<Profile, AccountRepositoryError> {
        Err(AccountRepositoryError::connection("fixture repository is read-only"))
    }

    async fn delete(&self, _id: &UserId) -> Result<(), AccountRepositoryError> {
        Ok(())
    }

    async fn find_credentials(
        &self,
        _email: &str,
    ) -> Result<Option<AccountCredentials>, AccountRepositoryError> {
        Ok(None)
    }

    async fn find_profile(&self, _id: &UserId) -> Result<Option<Profile>, AccountRepositoryError> {
        Ok(None)
    }

    async fn find_profile_by_email(
        &self,
        _email: &EmailAddress,
    ) -> Result<Option<Profile>, AccountRepositoryError> {
        Ok(None)
    }

    async fn list_staff(&self) -> Result<Vec<ProfileWithRoles>, AccountRepositoryError> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn fixture_lookups_find_nothing() {
        let repo = FixtureAccountRepository;
        assert!(repo.find_credentials("ada@example.org").await.expect("lookup").is_none());
        assert!(repo.find_profile(&UserId::random()).await.expect("lookup").is_none());
        assert!(repo.list_staff().await.expect("list").is_empty());
    }

    #[rstest]
    fn duplicate_email_error_names_the_address() {
        let err = AccountRepositoryError::duplicate_email("ada@example.org");
        assert_eq!(err.to_string(), "an account already exists for ada@example.org");
    }
}
