//! Port for append-only message persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Message, MessageId, TicketId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by message repository adapters.
    pub enum MessageRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "message repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "message repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageRepository: Send + Sync {
    async fn insert(&self, message: &Message) -> Result<(), MessageRepositoryError>;

    async fn find(&self, id: &MessageId) -> Result<Option<Message>, MessageRepositoryError>;

    /// Messages on a ticket, oldest first.
    async fn list_for_ticket(
        &self,
        ticket_id: &TicketId,
    ) -> Result<Vec<Message>, MessageRepositoryError>;

    /// Messages created at or after `since`, oldest first.
    async fn list_created_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<Message>, MessageRepositoryError>;
}

/// Fixture implementation holding no messages.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureMessageRepository;

#[async_trait]
impl MessageRepository for FixtureMessageRepository {
    async fn insert(&self, _message: &Message) -> Result<(), MessageRepositoryError> {
        Ok(())
    }

    async fn find(&self, _id: &MessageId) -> Result<Option<Message>, MessageRepositoryError> {
        Ok(None)
    }

    async fn list_for_ticket(
        &self,
        _ticket_id: &TicketId,
    ) -> Result<Vec<Message>, MessageRepositoryError> {
        Ok(Vec::new())
    }

    async fn list_created_since(
        &self,
        _since: DateTime<Utc>,
    ) -> Result<Vec<Message>, MessageRepositoryError> {
        Ok(Vec::new())
    }
}
