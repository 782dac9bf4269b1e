//! Who may see and change what.
//!
//! Every service consults these functions before touching a repository, so
//! the rules hold no matter which adapter stores the rows.

use super::{Role, RoleSet, Ticket, UserId};

/// An authenticated user together with the roles they hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub user_id: UserId,
    pub roles: RoleSet,
}

impl Actor {
    pub fn new(user_id: UserId, roles: RoleSet) -> Self {
        Self { user_id, roles }
    }
}

/// Owners and staff/admin may read a ticket.
///
/// # Examples
/// ```
/// use chrono::Utc;
/// use helpdesk::domain::{access, Actor, Role, RoleSet, Ticket, TicketSubject, UserId};
///
/// let student = Actor::new(UserId::random(), [Role::Student].into_iter().collect());
/// let ticket = Ticket::open(student.user_id, TicketSubject::new("Printer").unwrap(), Utc::now());
/// assert!(access::can_view_ticket(&student, &ticket));
///
/// let stranger = Actor::new(UserId::random(), [Role::Student].into_iter().collect());
/// assert!(!access::can_view_ticket(&stranger, &ticket));
/// ```
pub fn can_view_ticket(actor: &Actor, ticket: &Ticket) -> bool {
    ticket.student_id == actor.user_id || actor.roles.is_staff_or_admin()
}

pub fn can_post_message(actor: &Actor, ticket: &Ticket) -> bool {
    can_view_ticket(actor, ticket)
}

/// Students never change status, not even on their own tickets.
pub fn can_update_status(actor: &Actor) -> bool {
    actor.roles.is_staff_or_admin()
}

pub fn can_view_analytics(actor: &Actor) -> bool {
    actor.roles.is_admin()
}

pub fn can_list_staff(actor: &Actor) -> bool {
    actor.roles.is_admin()
}

pub fn can_create_ticket(actor: &Actor) -> bool {
    actor.roles.contains(Role::Student)
}

/// Attachments may be added by the message sender or by staff/admin.
pub fn can_attach_to_message(actor: &Actor, ticket: &Ticket, sender_id: &UserId) -> bool {
    can_view_ticket(actor, ticket) && (&actor.user_id == sender_id || actor.roles.is_staff_or_admin())
}

/// Outcome of checking whether a caller may grant `requested` to a new account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InviteDecision {
    Allowed,
    /// The caller is neither staff nor admin.
    Forbidden,
    /// A non-admin asked for the admin role.
    Escalation,
}

/// Decide whether `caller_roles` may invite an account with `requested`.
///
/// Invitations only grant staff or admin; callers must reject other roles
/// before asking.
pub fn invite_decision(caller_roles: &RoleSet, requested: Role) -> InviteDecision {
    if !caller_roles.is_staff_or_admin() {
        return InviteDecision::Forbidden;
    }
    if requested == Role::Admin && !caller_roles.is_admin() {
        return InviteDecision::Escalation;
    }
    InviteDecision::Allowed
}
