//! PostgreSQL-backed `MessageRepository` implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{MessageRepository, MessageRepositoryError};
use crate::domain::{Message, MessageId, TicketId};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::MessageRow;
use super::pool::{DbPool, PoolError};
use super::row_mapping::{RowDecodeError, message_from_row, message_to_row};
use super::schema::ticket_messages;

/// Diesel-backed implementation of the `MessageRepository` port.
#[derive(Clone)]
pub struct DieselMessageRepository {
    pool: DbPool,
}

impl DieselMessageRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> MessageRepositoryError {
    map_pool_error(error, MessageRepositoryError::connection)
}

fn diesel_error(error: diesel::result::Error) -> MessageRepositoryError {
    map_diesel_error(error, MessageRepositoryError::query, MessageRepositoryError::connection)
}

fn decode_error(error: RowDecodeError) -> MessageRepositoryError {
    MessageRepositoryError::query(error.to_string())
}

fn decode_rows(rows: Vec<MessageRow>) -> Result<Vec<Message>, MessageRepositoryError> {
    rows.into_iter()
        .map(message_from_row)
        .collect::<Result<_, _>>()
        .map_err(decode_error)
}

#[async_trait]
impl MessageRepository for DieselMessageRepository {
    async fn insert(&self, message: &Message) -> Result<(), MessageRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        diesel::insert_into(ticket_messages::table)
            .values(&message_to_row(message))
            .execute(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(())
    }

    async fn find(&self, id: &MessageId) -> Result<Option<Message>, MessageRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row = ticket_messages::table
            .find(id.as_uuid())
            .select(MessageRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;
        row.map(message_from_row).transpose().map_err(decode_error)
    }

    async fn list_for_ticket(
        &self,
        ticket_id: &TicketId,
    ) -> Result<Vec<Message>, MessageRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let rows = ticket_messages::table
            .filter(ticket_messages::ticket_id.eq(ticket_id.as_uuid()))
            .order((ticket_messages::created_at.asc(), ticket_messages::id.asc()))
            .select(MessageRow::as_select())
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        decode_rows(rows)
    }

    async fn list_created_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<Message>, MessageRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let rows = ticket_messages::table
            .filter(ticket_messages::created_at.ge(since))
            .order((ticket_messages::created_at.asc(), ticket_messages::id.asc()))
            .select(MessageRow::as_select())
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        decode_rows(rows)
    }
}
