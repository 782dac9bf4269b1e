//! Driving port for the staff directory.

use async_trait::async_trait;

use crate::domain::{Actor, Error, ProfileWithRoles};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StaffQuery: Send + Sync {
    /// Staff and admin profiles with their roles. Admin only.
    async fn list_staff(&self, actor: &Actor) -> Result<Vec<ProfileWithRoles>, Error>;
}
