//! PostgreSQL-backed `TicketRepository` implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::domain::ports::{TicketFilter, TicketRepository, TicketRepositoryError};
use crate::domain::{Message, Ticket, TicketId, TicketStatus};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::TicketRow;
use super::pool::{DbPool, PoolError};
use super::row_mapping::{RowDecodeError, message_to_row, ticket_from_row, ticket_to_row};
use super::schema::{ticket_messages, tickets};

/// Diesel-backed implementation of the `TicketRepository` port.
#[derive(Clone)]
pub struct DieselTicketRepository {
    pool: DbPool,
}

impl DieselTicketRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> TicketRepositoryError {
    map_pool_error(error, TicketRepositoryError::connection)
}

fn diesel_error(error: diesel::result::Error) -> TicketRepositoryError {
    map_diesel_error(error, TicketRepositoryError::query, TicketRepositoryError::connection)
}

fn decode_rows(rows: Vec<TicketRow>) -> Result<Vec<Ticket>, TicketRepositoryError> {
    rows.into_iter()
        .map(ticket_from_row)
        .collect::<Result<_, RowDecodeError>>()
        .map_err(|err| TicketRepositoryError::query(err.to_string()))
}

#[async_trait]
impl TicketRepository for DieselTicketRepository {
    async fn create(
        &self,
        ticket: &Ticket,
        opening_message: Option<Message>,
    ) -> Result<(), TicketRepositoryError> {
        let ticket_row = ticket_to_row(ticket);
        let message_row = opening_message.as_ref().map(message_to_row);
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        conn.transaction(|conn| {
            async move {
                diesel::insert_into(tickets::table)
                    .values(&ticket_row)
                    .execute(conn)
                    .await?;
                if let Some(row) = message_row {
                    diesel::insert_into(ticket_messages::table)
                        .values(&row)
                        .execute(conn)
                        .await?;
                }
                Ok::<_, diesel::result::Error>(())
            }
            .scope_boxed()
        })
        .await
        .map_err(diesel_error)
    }

    async fn find(&self, id: &TicketId) -> Result<Option<Ticket>, TicketRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row = tickets::table
            .find(id.as_uuid())
            .select(TicketRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;
        row.map(ticket_from_row)
            .transpose()
            .map_err(|err| TicketRepositoryError::query(err.to_string()))
    }

    async fn list(&self, filter: &TicketFilter) -> Result<Vec<Ticket>, TicketRepositoryError> {
        let mut query = tickets::table.select(TicketRow::as_select()).into_boxed();
        if let Some(student_id) = filter.student_id {
            query = query.filter(tickets::student_id.eq(*student_id.as_uuid()));
        }
        if let Some(status) = filter.status {
            query = query.filter(tickets::status.eq(status.as_str()));
        }
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let rows = query
            .order((tickets::created_at.desc(), tickets::id.asc()))
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        decode_rows(rows)
    }

    async fn update_status(
        &self,
        id: &TicketId,
        status: TicketStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Ticket>, TicketRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row = diesel::update(tickets::table.find(id.as_uuid()))
            .set((
                tickets::status.eq(status.as_str()),
                tickets::updated_at.eq(updated_at),
            ))
            .returning(TicketRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;
        row.map(ticket_from_row)
            .transpose()
            .map_err(|err| TicketRepositoryError::query(err.to_string()))
    }

    async fn list_created_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<Ticket>, TicketRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let rows = tickets::table
            .filter(tickets::created_at.ge(since))
            .order((tickets::created_at.asc(), tickets::id.asc()))
            .select(TicketRow::as_select())
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        decode_rows(rows)
    }
}
