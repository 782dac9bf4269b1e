//! PostgreSQL-backed `RoleRepository` implementation.
//!
//! The two predicates call the `has_role` and `can_invite_staff` SQL
//! functions so the database stays the single definition of who may invite.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{RoleRepository, RoleRepositoryError};
use crate::domain::{Role, RoleSet, UserId};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::NewRoleRow;
use super::pool::{DbPool, PoolError};
use super::row_mapping::role_from_str;
use super::schema::{can_invite_staff, has_role, user_roles};

/// Diesel-backed implementation of the `RoleRepository` port.
#[derive(Clone)]
pub struct DieselRoleRepository {
    pool: DbPool,
}

impl DieselRoleRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> RoleRepositoryError {
    map_pool_error(error, RoleRepositoryError::connection)
}

fn diesel_error(error: diesel::result::Error) -> RoleRepositoryError {
    map_diesel_error(error, RoleRepositoryError::query, RoleRepositoryError::connection)
}

#[async_trait]
impl RoleRepository for DieselRoleRepository {
    async fn roles_for(&self, user_id: &UserId) -> Result<RoleSet, RoleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let raw: Vec<String> = user_roles::table
            .filter(user_roles::user_id.eq(user_id.as_uuid()))
            .select(user_roles::role)
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        raw.iter()
            .map(|role| {
                role_from_str(*user_id.as_uuid(), role)
                    .map_err(|err| RoleRepositoryError::query(err.to_string()))
            })
            .collect()
    }

    async fn assign(&self, user_id: &UserId, role: Role) -> Result<bool, RoleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let inserted = diesel::insert_into(user_roles::table)
            .values(&NewRoleRow {
                user_id: *user_id.as_uuid(),
                role: role.as_str(),
            })
            .on_conflict_do_nothing()
            .execute(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(inserted > 0)
    }

    async fn has_role(&self, user_id: &UserId, role: Role) -> Result<bool, RoleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        diesel::select(has_role(*user_id.as_uuid(), role.as_str()))
            .get_result(&mut conn)
            .await
            .map_err(diesel_error)
    }

    async fn can_invite_staff(&self, user_id: &UserId) -> Result<bool, RoleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        diesel::select(can_invite_staff(*user_id.as_uuid()))
            .get_result(&mut conn)
            .await
            .map_err(diesel_error)
    }
}
