//! Driving ports for ticket use-cases.

use async_trait::async_trait;

use crate::domain::{Actor, Error, Message, MessageBody, Ticket, TicketId, TicketStatus, TicketSubject};

/// Validated input for filing a ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTicketRequest {
    pub subject: TicketSubject,
    /// Optional first message stored with the ticket.
    pub opening_message: Option<MessageBody>,
}

/// Result of filing a ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedTicket {
    pub ticket: Ticket,
    pub opening_message: Option<Message>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TicketCommand: Send + Sync {
    /// File a ticket. Only holders of the student role may do so.
    async fn create_ticket(
        &self,
        actor: &Actor,
        request: CreateTicketRequest,
    ) -> Result<CreatedTicket, Error>;

    /// Change a ticket's status. Staff and admin only.
    async fn update_status(
        &self,
        actor: &Actor,
        ticket_id: &TicketId,
        status: TicketStatus,
    ) -> Result<Ticket, Error>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TicketQuery: Send + Sync {
    /// Tickets visible to `actor`, newest first.
    async fn list_tickets(
        &self,
        actor: &Actor,
        status: Option<TicketStatus>,
    ) -> Result<Vec<Ticket>, Error>;

    /// A single ticket; hidden tickets are reported as not found.
    async fn get_ticket(&self, actor: &Actor, ticket_id: &TicketId) -> Result<Ticket, Error>;
}
