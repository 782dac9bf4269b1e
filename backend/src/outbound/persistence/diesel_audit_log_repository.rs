//! PostgreSQL-backed `AuditLogRepository` implementation.

use async_trait::async_trait;
use diesel_async::RunQueryDsl;

use crate::domain::AuditEntry;
use crate::domain::ports::{AuditLogRepository, AuditLogRepositoryError};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::NewAuditLogRow;
use super::pool::DbPool;
use super::schema::security_audit_logs;

/// Appends rows to `security_audit_logs`. Rows are never updated.
#[derive(Clone)]
pub struct DieselAuditLogRepository {
    pool: DbPool,
}

impl DieselAuditLogRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn audit_row(entry: &AuditEntry) -> NewAuditLogRow<'_> {
    NewAuditLogRow {
        id: entry.id,
        user_id: entry.user_id.map(|id| *id.as_uuid()),
        action: entry.action.as_str(),
        details: &entry.details,
        ip_address: entry.ip_address.map(|ip| ip.to_string()),
        created_at: entry.created_at,
    }
}

#[async_trait]
impl AuditLogRepository for DieselAuditLogRepository {
    async fn append(&self, entry: &AuditEntry) -> Result<(), AuditLogRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, AuditLogRepositoryError::connection))?;
        diesel::insert_into(security_audit_logs::table)
            .values(&audit_row(entry))
            .execute(&mut conn)
            .await
            .map_err(|err| {
                map_diesel_error(
                    err,
                    AuditLogRepositoryError::query,
                    AuditLogRepositoryError::connection,
                )
            })?;
        Ok(())
    }
}
