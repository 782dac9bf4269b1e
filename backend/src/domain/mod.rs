//! Domain primitives, aggregates and services.
//!
//! Purpose: Define strongly typed helpdesk entities and the services that
//! enforce who may read and change them. Nothing here knows about HTTP or
//! SQL; adapters talk to the domain through [`ports`].
//!
//! Public surface:
//! - Error (alias to `error::Error`) — API error response payload.
//! - ErrorCode (alias to `error::ErrorCode`) — stable error identifier.
//! - Identity, ticket, audit and analytics types re-exported below.
//! - Services implementing the driving ports.

pub mod access;
pub mod error;
pub mod ports;

mod account_service;
mod analytics;
mod analytics_service;
mod audit;
mod auth;
mod demo_accounts;
mod identity;
mod message_service;
pub(crate) mod port_errors;
mod staff_invitation;
mod ticket_service;
mod tickets;
mod trace_id;

pub use self::access::{Actor, InviteDecision};
pub use self::account_service::AccountService;
pub use self::analytics::{
    AnalyticsReport, AnalyticsWindow, DEFAULT_WINDOW_DAYS, DateCount, MAX_WINDOW_DAYS,
    StaffMember, StaffPerformance, StatusCounts, SubjectCount, TOP_SUBJECTS, WindowOutOfRange,
    build_report,
};
pub use self::analytics_service::{AnalyticsService, StaffDirectory};
pub use self::audit::{AuditAction, AuditEntry};
pub use self::auth::{LoginCredentials, LoginValidationError};
pub use self::demo_accounts::{DEMO_ACCOUNTS, DEMO_PASSWORD, DemoAccount, DemoAccountSeeder};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::identity::{
    EMAIL_MAX, EmailAddress, IdentityValidationError, PASSWORD_MAX, PASSWORD_MIN,
    PROFILE_NAME_MAX, ParseRoleError, Password, Profile, ProfileName, ProfileWithRoles, Role,
    RoleSet, SignupRequest, UserId,
};
pub use self::message_service::MessageService;
pub use self::staff_invitation::StaffInvitationService;
pub use self::ticket_service::TicketService;
pub use self::tickets::{
    AttachmentFormat, AttachmentKind, AttachmentValidationError, MAX_ATTACHMENT_BYTES,
    MESSAGE_CONTENT_MAX, MediaAsset, MediaAssetId, Message, MessageBody, MessageId, MessageKind,
    MessageWithAttachments, ParseMessageKindError, ParseTicketStatusError, SUBJECT_MAX, Ticket,
    TicketId, TicketStatus, TicketSubject, TicketValidationError, storage_path, validate_upload,
};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use helpdesk::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
