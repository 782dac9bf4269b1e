//! Port for role grants and the two role predicates.

use async_trait::async_trait;

use crate::domain::{Role, RoleSet, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by role repository adapters.
    pub enum RoleRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "role repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "role repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// All roles held by `user_id`; empty for unknown users.
    async fn roles_for(&self, user_id: &UserId) -> Result<RoleSet, RoleRepositoryError>;

    /// Grant `role`. Returns `false` when the grant already existed.
    async fn assign(&self, user_id: &UserId, role: Role) -> Result<bool, RoleRepositoryError>;

    /// Whether `user_id` holds `role`.
    async fn has_role(&self, user_id: &UserId, role: Role) -> Result<bool, RoleRepositoryError>;

    /// Whether `user_id` may invite staff accounts at all.
    async fn can_invite_staff(&self, user_id: &UserId) -> Result<bool, RoleRepositoryError>;
}

/// Fixture implementation where nobody holds any role.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureRoleRepository;

#[async_trait]
impl RoleRepository for FixtureRoleRepository {
    async fn roles_for(&self, _user_id: &UserId) -> Result<RoleSet, RoleRepositoryError> {
        Ok(RoleSet::default())
    }

    async fn assign(&self, _user_id: &UserId, _role: Role) -> Result<bool, RoleRepositoryError> {
        Ok(true)
    }

    async fn has_role(&self, _user_id: &UserId, _role: Role) -> Result<bool, RoleRepositoryError> {
        Ok(false)
    }

    async fn can_invite_staff(&self, _user_id: &UserId) -> Result<bool, RoleRepositoryError> {
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fixture_grants_nothing() {
        let repo = FixtureRoleRepository;
        let user = UserId::random();
        assert!(repo.roles_for(&user).await.expect("roles").is_empty());
        assert!(!repo.can_invite_staff(&user).await.expect("predicate"));
        assert!(!repo.has_role(&user, Role::Admin).await.expect("predicate"));
    }
}
