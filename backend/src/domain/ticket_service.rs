//! Ticket filing, listing and status changes.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::access;
use crate::domain::port_errors::map_ticket_error;
use crate::domain::ports::{
    CreateTicketRequest, CreatedTicket, TicketCommand, TicketFilter, TicketQuery, TicketRepository,
};
use crate::domain::{Actor, Error, Message, Ticket, TicketId, TicketStatus};

/// Implements the ticket driving ports.
#[derive(Clone)]
pub struct TicketService<T> {
    tickets: Arc<T>,
    clock: Arc<dyn Clock>,
}

impl<T> TicketService<T> {
    pub fn new(tickets: Arc<T>, clock: Arc<dyn Clock>) -> Self {
        Self { tickets, clock }
    }
}

pub(crate) fn ticket_not_found() -> Error {
    Error::not_found("ticket not found")
}

/// Load a ticket and hide it unless `actor` may see it.
pub(crate) async fn load_visible_ticket<T: TicketRepository + ?Sized>(
    tickets: &T,
    actor: &Actor,
    ticket_id: &TicketId,
) -> Result<Ticket, Error> {
    tickets
        .find(ticket_id)
        .await
        .map_err(map_ticket_error)?
        .filter(|ticket| access::can_view_ticket(actor, ticket))
        .ok_or_else(ticket_not_found)
}

#[async_trait]
impl<T> TicketCommand for TicketService<T>
where
    T: TicketRepository,
{
    async fn create_ticket(
        &self,
        actor: &Actor,
        request: CreateTicketRequest,
    ) -> Result<CreatedTicket, Error> {
        if !access::can_create_ticket(actor) {
            return Err(Error::forbidden("only students can file tickets"));
        }

        let now = self.clock.utc();
        let ticket = Ticket::open(actor.user_id, request.subject, now);
        let opening_message = request
            .opening_message
            .map(|body| Message::compose(ticket.id, actor.user_id, body, now));
        self.tickets
            .create(&ticket, opening_message.clone())
            .await
            .map_err(map_ticket_error)?;

        info!(ticket_id = %ticket.id, student_id = %actor.user_id, "ticket filed");
        Ok(CreatedTicket {
            ticket,
            opening_message,
        })
    }

    async fn update_status(
        &self,
        actor: &Actor,
        ticket_id: &TicketId,
        status: TicketStatus,
    ) -> Result<Ticket, Error> {
        // Hidden tickets stay hidden even from callers who may not edit.
        load_visible_ticket(self.tickets.as_ref(), actor, ticket_id).await?;
        if !access::can_update_status(actor) {
            return Err(Error::forbidden("only staff can change ticket status"));
        }

        let updated = self
            .tickets
            .update_status(ticket_id, status, self.clock.utc())
            .await
            .map_err(map_ticket_error)?
            .ok_or_else(ticket_not_found)?;
        info!(ticket_id = %ticket_id, status = %status, actor = %actor.user_id, "ticket status changed");
        Ok(updated)
    }
}

#[async_trait]
impl<T> TicketQuery for TicketService<T>
where
    T: TicketRepository,
{
    async fn list_tickets(
        &self,
        actor: &Actor,
        status: Option<TicketStatus>,
    ) -> Result<Vec<Ticket>, Error> {
        let filter = TicketFilter {
            student_id: (!actor.roles.is_staff_or_admin()).then_some(actor.user_id),
            status,
        };
        self.tickets.list(&filter).await.map_err(map_ticket_error)
    }

    async fn get_ticket(&self, actor: &Actor, ticket_id: &TicketId) -> Result<Ticket, Error> {
        load_visible_ticket(self.tickets.as_ref(), actor, ticket_id).await
    }
}
