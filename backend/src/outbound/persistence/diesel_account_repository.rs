//! PostgreSQL-backed `AccountRepository` implementation.
//!
//! An account spans three tables: `users` (credentials), `profiles` and
//! `user_roles`. Creation writes all three in one transaction.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{
    AccountCredentials, AccountRepository, AccountRepositoryError, NewAccount,
};
use crate::domain::{EmailAddress, Profile, ProfileWithRoles, Role, RoleSet, UserId};

use super::diesel_error_mapping::{is_unique_violation_on, map_diesel_error, map_pool_error};
use super::models::{
    CredentialRow, NewProfileRow, NewRoleRow, NewUserRow, ProfileRow, RoleRow,
};
use super::pool::DbPool;
use super::row_mapping::{RowDecodeError, profile_from_row, role_from_str};
use super::schema::{profiles, user_roles, users};

const EMAIL_UNIQUE_INDEX: &str = "users_email_key";

/// Diesel-backed implementation of the `AccountRepository` port.
#[derive(Clone)]
pub struct DieselAccountRepository {
    pool: DbPool,
}

impl DieselAccountRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: super::pool::PoolError) -> AccountRepositoryError {
    map_pool_error(error, AccountRepositoryError::connection)
}

fn diesel_error(error: diesel::result::Error) -> AccountRepositoryError {
    map_diesel_error(
        error,
        AccountRepositoryError::query,
        AccountRepositoryError::connection,
    )
}

fn decode_error(error: RowDecodeError) -> AccountRepositoryError {
    AccountRepositoryError::query(error.to_string())
}

#[async_trait]
impl AccountRepository for DieselAccountRepository {
    async fn create(&self, account: &NewAccount) -> Result<Profile, AccountRepositoryError> {
        let id = *account.id.as_uuid();
        let user_row = NewUserRow {
            id,
            email: account.email.as_ref(),
            password_hash: &account.password_hash,
            created_at: account.created_at,
        };
        let profile_row = NewProfileRow {
            id,
            name: account.name.as_ref(),
            email: account.email.as_ref(),
            created_at: account.created_at,
        };
        let role_rows: Vec<NewRoleRow<'_>> = account
            .roles
            .iter()
            .map(|role| NewRoleRow {
                user_id: id,
                role: role.as_str(),
            })
            .collect();

        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let result = conn
            .transaction(|conn| {
                async move {
                    diesel::insert_into(users::table)
                        .values(&user_row)
                        .execute(conn)
                        .await?;
                    diesel::insert_into(profiles::table)
                        .values(&profile_row)
                        .execute(conn)
                        .await?;
                    if !role_rows.is_empty() {
                        diesel::insert_into(user_roles::table)
                            .values(&role_rows)
                            .on_conflict_do_nothing()
                            .execute(conn)
                            .await?;
                    }
                    Ok::<_, diesel::result::Error>(())
                }
                .scope_boxed()
            })
            .await;

        match result {
            Ok(()) => Ok(Profile {
                id: account.id,
                name: account.name.clone(),
                email: account.email.clone(),
                created_at: account.created_at,
            }),
            Err(err) if is_unique_violation_on(&err, EMAIL_UNIQUE_INDEX) => {
                Err(AccountRepositoryError::duplicate_email(account.email.as_ref()))
            }
            Err(err) => Err(diesel_error(err)),
        }
    }

    async fn delete(&self, id: &UserId) -> Result<(), AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        diesel::delete(users::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(())
    }

    async fn find_credentials(
        &self,
        email: &str,
    ) -> Result<Option<AccountCredentials>, AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row = users::table
            .filter(users::email.eq(email.trim().to_lowercase()))
            .select(CredentialRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;
        Ok(row.map(|row| AccountCredentials {
            user_id: UserId::from(row.id),
            password_hash: row.password_hash,
        }))
    }

    async fn find_profile(&self, id: &UserId) -> Result<Option<Profile>, AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row = profiles::table
            .find(id.as_uuid())
            .select(ProfileRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;
        row.map(profile_from_row).transpose().map_err(decode_error)
    }

    async fn find_profile_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<Profile>, AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row = profiles::table
            .filter(profiles::email.eq(email.as_ref()))
            .select(ProfileRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;
        row.map(profile_from_row).transpose().map_err(decode_error)
    }

    async fn list_staff(&self) -> Result<Vec<ProfileWithRoles>, AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let staff_ids: Vec<Uuid> = user_roles::table
            .filter(user_roles::role.eq_any([Role::Staff.as_str(), Role::Admin.as_str()]))
            .select(user_roles::user_id)
            .distinct()
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        if staff_ids.is_empty() {
            return Ok(Vec::new());
        }

        let profile_rows: Vec<ProfileRow> = profiles::table
            .filter(profiles::id.eq_any(&staff_ids))
            .order((profiles::name.asc(), profiles::id.asc()))
            .select(ProfileRow::as_select())
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        let role_rows: Vec<RoleRow> = user_roles::table
            .filter(user_roles::user_id.eq_any(&staff_ids))
            .select(RoleRow::as_select())
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;

        let mut roles: HashMap<Uuid, RoleSet> = HashMap::new();
        for row in role_rows {
            let role = role_from_str(row.user_id, &row.role).map_err(decode_error)?;
            roles.entry(row.user_id).or_default().insert(role);
        }
        profile_rows
            .into_iter()
            .map(|row| {
                let member_roles = roles.remove(&row.id).unwrap_or_default();
                let profile = profile_from_row(row).map_err(decode_error)?;
                Ok(ProfileWithRoles {
                    profile,
                    roles: member_roles,
                })
            })
            .collect()
    }
}
