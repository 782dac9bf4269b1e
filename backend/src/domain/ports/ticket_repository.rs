//! Port for ticket persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Message, Ticket, TicketId, TicketStatus, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by ticket repository adapters.
    pub enum TicketRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "ticket repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "ticket repository query failed: {message}",
    }
}

/// Filter applied when listing tickets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TicketFilter {
    /// Restrict to tickets filed by this student.
    pub student_id: Option<UserId>,
    pub status: Option<TicketStatus>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TicketRepository: Send + Sync {
    /// Insert a ticket and, when given, its opening message in one unit of work.
    async fn create(
        &self,
        ticket: &Ticket,
        opening_message: Option<Message>,
    ) -> Result<(), TicketRepositoryError>;

    async fn find(&self, id: &TicketId) -> Result<Option<Ticket>, TicketRepositoryError>;

    /// Tickets matching `filter`, newest first.
    async fn list(&self, filter: &TicketFilter) -> Result<Vec<Ticket>, TicketRepositoryError>;

    /// Set the status and bump `updated_at`. Returns `None` for unknown ids.
    async fn update_status(
        &self,
        id: &TicketId,
        status: TicketStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Ticket>, TicketRepositoryError>;

    /// Tickets created at or after `since`, oldest first.
    async fn list_created_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<Ticket>, TicketRepositoryError>;
}

/// Fixture implementation holding no tickets.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureTicketRepository;

#[async_trait]
impl TicketRepository for FixtureTicketRepository {
    async fn create(
        &self,
        _ticket: &Ticket,
        _opening_message: Option<Message>,
    ) -> Result<(), TicketRepositoryError> {
        Ok(())
    }

    async fn find(&self, _id: &TicketId) -> Result<Option<Ticket>, TicketRepositoryError> {
        Ok(None)
    }

    async fn list(&self, _filter: &TicketFilter) -> Result<Vec<Ticket>, TicketRepositoryError> {
        Ok(Vec::new())
    }

    async fn update_status(
        &self,
        _id: &TicketId,
        _status: TicketStatus,
        _updated_at: DateTime<Utc>,
    ) -> Result<Option<Ticket>, TicketRepositoryError> {
        Ok(None)
    }

    async fn list_created_since(
        &self,
        _since: DateTime<Utc>,
    ) -> Result<Vec<Ticket>, TicketRepositoryError> {
        Ok(Vec::new())
    }
}
