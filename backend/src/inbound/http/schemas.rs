//! OpenAPI schema definitions for domain types.
//!
//! Domain types remain framework-agnostic by not deriving `ToSchema`. The
//! wrappers here mirror the JSON those types serialise to and live in the
//! inbound adapter layer where framework concerns belong.
#![expect(
    dead_code,
    reason = "Schema wrappers are only read by utoipa for OpenAPI generation"
)]

use chrono::{DateTime, NaiveDate, Utc};
use utoipa::ToSchema;

/// Stable machine-readable error codes returned in API error responses.
#[derive(ToSchema)]
#[schema(as = ErrorCode)]
pub enum ErrorCodeSchema {
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    #[schema(rename = "unauthorized")]
    Unauthorized,
    #[schema(rename = "forbidden")]
    Forbidden,
    #[schema(rename = "not_found")]
    NotFound,
    #[schema(rename = "conflict")]
    Conflict,
    #[schema(rename = "payload_too_large")]
    PayloadTooLarge,
    #[schema(rename = "unsupported_media_type")]
    UnsupportedMediaType,
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    #[schema(rename = "internal_error")]
    InternalError,
}

/// API error response payload.
#[derive(ToSchema)]
#[schema(as = Error, rename_all = "camelCase")]
pub struct ErrorSchema {
    #[schema(example = "invalid_request")]
    code: ErrorCodeSchema,
    #[schema(example = "subject must not be empty")]
    message: String,
    /// Correlation identifier echoed in the `trace-id` header.
    #[schema(example = "8f14e45f-ceea-467f-a0e6-6a4b1c6f3a6d")]
    trace_id: Option<String>,
    /// Field name and validation code for `invalid_request` errors.
    details: Option<serde_json::Value>,
}

#[derive(ToSchema)]
#[schema(as = Role)]
pub enum RoleSchema {
    #[schema(rename = "student")]
    Student,
    #[schema(rename = "staff")]
    Staff,
    #[schema(rename = "admin")]
    Admin,
}

#[derive(ToSchema)]
#[schema(as = Profile, rename_all = "camelCase")]
pub struct ProfileSchema {
    #[schema(value_type = String, format = Uuid)]
    id: String,
    #[schema(example = "Ada Lovelace")]
    name: String,
    #[schema(example = "ada@example.org")]
    email: String,
    created_at: DateTime<Utc>,
}

/// A profile together with the roles it holds.
#[derive(ToSchema)]
#[schema(as = ProfileWithRoles)]
pub struct ProfileWithRolesSchema {
    profile: ProfileSchema,
    roles: Vec<RoleSchema>,
}

#[derive(ToSchema)]
#[schema(as = TicketStatus)]
pub enum TicketStatusSchema {
    #[schema(rename = "pending")]
    Pending,
    #[schema(rename = "in_progress")]
    InProgress,
    #[schema(rename = "completed")]
    Completed,
}

/// A student-filed support request.
#[derive(ToSchema)]
#[schema(as = Ticket, rename_all = "camelCase")]
pub struct TicketSchema {
    #[schema(value_type = String, format = Uuid)]
    id: String,
    #[schema(value_type = String, format = Uuid)]
    student_id: String,
    #[schema(example = "Cannot access the library portal")]
    subject: String,
    status: TicketStatusSchema,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(ToSchema)]
#[schema(as = MessageType)]
pub enum MessageKindSchema {
    #[schema(rename = "text")]
    Text,
    #[schema(rename = "voice")]
    Voice,
}

#[derive(ToSchema)]
#[schema(as = AttachmentKind)]
pub enum AttachmentKindSchema {
    #[schema(rename = "image")]
    Image,
    #[schema(rename = "pdf")]
    Pdf,
}

/// Stored attachment metadata.
#[derive(ToSchema)]
#[schema(as = MediaAsset, rename_all = "camelCase")]
pub struct MediaAssetSchema {
    #[schema(value_type = String, format = Uuid)]
    id: String,
    #[schema(value_type = String, format = Uuid)]
    message_id: String,
    #[schema(example = "tickets/5b0c.../a1f3....png")]
    storage_path: String,
    file_type: AttachmentKindSchema,
    #[schema(example = "image/png")]
    content_type: String,
    byte_size: u64,
    /// Lowercase hex SHA-256 of the stored bytes.
    sha256: String,
    created_at: DateTime<Utc>,
}

/// A message posted on a ticket.
#[derive(ToSchema)]
#[schema(as = Message, rename_all = "camelCase")]
pub struct MessageSchema {
    #[schema(value_type = String, format = Uuid)]
    id: String,
    #[schema(value_type = String, format = Uuid)]
    ticket_id: String,
    #[schema(value_type = String, format = Uuid)]
    sender_id: String,
    message_type: MessageKindSchema,
    content: String,
    /// Only present on voice messages.
    transcript: Option<String>,
    created_at: DateTime<Utc>,
}

/// A message with the attachments stored against it.
#[derive(ToSchema)]
#[schema(as = MessageWithAttachments, rename_all = "camelCase")]
pub struct MessageWithAttachmentsSchema {
    #[schema(value_type = String, format = Uuid)]
    id: String,
    #[schema(value_type = String, format = Uuid)]
    ticket_id: String,
    #[schema(value_type = String, format = Uuid)]
    sender_id: String,
    message_type: MessageKindSchema,
    content: String,
    transcript: Option<String>,
    created_at: DateTime<Utc>,
    attachments: Vec<MediaAssetSchema>,
}

#[derive(ToSchema)]
#[schema(as = StatusCounts, rename_all = "camelCase")]
pub struct StatusCountsSchema {
    pending: u64,
    in_progress: u64,
    completed: u64,
}

#[derive(ToSchema)]
#[schema(as = DateCount)]
pub struct DateCountSchema {
    date: NaiveDate,
    count: u64,
}

#[derive(ToSchema)]
#[schema(as = SubjectCount)]
pub struct SubjectCountSchema {
    subject: String,
    count: u64,
}

#[derive(ToSchema)]
#[schema(as = StaffPerformance, rename_all = "camelCase")]
pub struct StaffPerformanceSchema {
    #[schema(value_type = String, format = Uuid)]
    staff_id: String,
    name: String,
    messages_sent: u64,
    tickets_handled: u64,
    avg_first_response_minutes: Option<f64>,
    tickets_resolved: u64,
    avg_resolution_hours: Option<f64>,
}

/// Admin analytics over a trailing window of whole UTC days.
#[derive(ToSchema)]
#[schema(as = AnalyticsReport, rename_all = "camelCase")]
pub struct AnalyticsReportSchema {
    window_days: u16,
    generated_at: DateTime<Utc>,
    total_tickets: u64,
    status_counts: StatusCountsSchema,
    tickets_by_date: Vec<DateCountSchema>,
    tickets_by_subject: Vec<SubjectCountSchema>,
    staff_performance: Vec<StaffPerformanceSchema>,
}

/// Account created by a staff invitation.
#[derive(ToSchema)]
#[schema(as = InvitedStaff, rename_all = "camelCase")]
pub struct InvitedStaffSchema {
    #[schema(value_type = String, format = Uuid)]
    user_id: String,
    email: String,
    name: String,
    role: RoleSchema,
}

#[derive(ToSchema)]
#[schema(as = DemoAccountStatus)]
pub enum DemoAccountStatusSchema {
    #[schema(rename = "created")]
    Created,
    #[schema(rename = "existing")]
    Existing,
}

#[derive(ToSchema)]
#[schema(as = SeededAccount, rename_all = "camelCase")]
pub struct SeededAccountSchema {
    #[schema(value_type = String, format = Uuid)]
    user_id: String,
    email: String,
    role: RoleSchema,
    status: DemoAccountStatusSchema,
    role_added: bool,
}

/// Outcome of seeding the demo accounts.
#[derive(ToSchema)]
#[schema(as = DemoSeedReport)]
pub struct DemoSeedReportSchema {
    accounts: Vec<SeededAccountSchema>,
}
