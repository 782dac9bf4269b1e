//! Tests for ticket, message and attachment validation.

use super::*;
use chrono::{TimeZone, Utc};
use rstest::rstest;
use serde_json::json;
use uuid::Uuid;

use crate::domain::UserId;

#[rstest]
#[case("", Err(TicketValidationError::EmptySubject))]
#[case("   ", Err(TicketValidationError::EmptySubject))]
#[case("  Cannot log in  ", Ok("Cannot log in"))]
fn subjects_are_trimmed(
    #[case] raw: &str,
    #[case] expected: Result<&str, TicketValidationError>,
) {
    let result = TicketSubject::new(raw).map(String::from);
    assert_eq!(result, expected.map(str::to_owned));
}

#[rstest]
fn subject_length_is_bounded() {
    let at_limit = "s".repeat(SUBJECT_MAX);
    assert!(TicketSubject::new(&at_limit).is_ok());
    assert_eq!(
        TicketSubject::new(format!("{at_limit}s")),
        Err(TicketValidationError::SubjectTooLong { max: SUBJECT_MAX })
    );
}

#[rstest]
#[case("pending", TicketStatus::Pending)]
#[case("in_progress", TicketStatus::InProgress)]
#[case("completed", TicketStatus::Completed)]
#[case("resolved", TicketStatus::Completed)]
fn statuses_parse_including_legacy(#[case] raw: &str, #[case] expected: TicketStatus) {
    assert_eq!(raw.parse::<TicketStatus>(), Ok(expected));
    let from_json: TicketStatus = serde_json::from_value(json!(raw)).expect("status json");
    assert_eq!(from_json, expected);
}

#[rstest]
fn completed_never_serialises_as_resolved() {
    let value = serde_json::to_value(TicketStatus::Completed).expect("status json");
    assert_eq!(value, json!("completed"));
    assert!("closed".parse::<TicketStatus>().is_err());
}

#[rstest]
fn opened_tickets_start_pending() {
    let now = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).single().expect("timestamp");
    let subject = TicketSubject::new("Wi-Fi").expect("subject");
    let ticket = Ticket::open(UserId::random(), subject, now);
    assert_eq!(ticket.status, TicketStatus::Pending);
    assert_eq!(ticket.created_at, ticket.updated_at);
}

#[rstest]
#[case(MessageKind::Text, "", None, TicketValidationError::EmptyContent)]
#[case(MessageKind::Text, "hello", Some("words"), TicketValidationError::TranscriptRequiresVoice)]
fn invalid_message_bodies(
    #[case] kind: MessageKind,
    #[case] content: &str,
    #[case] transcript: Option<&str>,
    #[case] expected: TicketValidationError,
) {
    assert_eq!(MessageBody::new(kind, content, transcript), Err(expected));
}

#[rstest]
fn message_content_length_is_bounded() {
    let too_long = "m".repeat(MESSAGE_CONTENT_MAX + 1);
    assert_eq!(
        MessageBody::text(&too_long),
        Err(TicketValidationError::ContentTooLong {
            max: MESSAGE_CONTENT_MAX
        })
    );
}

#[rstest]
fn blank_transcript_is_dropped() {
    let body = MessageBody::new(MessageKind::Text, " hi ", Some("   ")).expect("body");
    assert_eq!(body.content(), "hi");
    assert_eq!(body.transcript(), None);
}

#[rstest]
fn message_serialises_flat_with_message_type() {
    let created_at = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).single().expect("timestamp");
    let message = Message {
        id: MessageId::from(Uuid::nil()),
        ticket_id: TicketId::from(Uuid::nil()),
        sender_id: UserId::from(Uuid::nil()),
        body: MessageBody::new(MessageKind::Voice, "note", Some("spoken words")).expect("body"),
        created_at,
    };
    let value = serde_json::to_value(&message).expect("message json");
    assert_eq!(value["messageType"], json!("voice"));
    assert_eq!(value["transcript"], json!("spoken words"));
    assert_eq!(value["content"], json!("note"));
}

#[rstest]
#[case(Some("image/png"), None, AttachmentKind::Image, "png")]
#[case(Some("IMAGE/JPEG; charset=binary"), None, AttachmentKind::Image, "jpg")]
#[case(Some("image/webp"), Some("ignored.pdf"), AttachmentKind::Image, "webp")]
#[case(Some("application/pdf"), None, AttachmentKind::Pdf, "pdf")]
#[case(None, Some("scan.jpeg"), AttachmentKind::Image, "jpg")]
#[case(Some("application/octet-stream"), Some("report.PDF"), AttachmentKind::Pdf, "pdf")]
fn accepted_uploads(
    #[case] declared: Option<&str>,
    #[case] file_name: Option<&str>,
    #[case] kind: AttachmentKind,
    #[case] extension: &str,
) {
    let format = validate_upload(declared, file_name, 512).expect("accepted upload");
    assert_eq!(format.kind, kind);
    assert_eq!(format.extension, extension);
}

#[rstest]
#[case(Some("text/plain"), None, 10)]
#[case(None, Some("archive.zip"), 10)]
#[case(None, None, 10)]
fn unsupported_uploads(
    #[case] declared: Option<&str>,
    #[case] file_name: Option<&str>,
    #[case] size: usize,
) {
    let err = validate_upload(declared, file_name, size).expect_err("rejected upload");
    assert!(matches!(err, AttachmentValidationError::UnsupportedType { .. }));
}

#[rstest]
#[case(0, AttachmentValidationError::Empty)]
#[case(MAX_ATTACHMENT_BYTES + 1, AttachmentValidationError::TooLarge { max: MAX_ATTACHMENT_BYTES, actual: MAX_ATTACHMENT_BYTES + 1 })]
fn upload_size_limits(#[case] size: usize, #[case] expected: AttachmentValidationError) {
    assert_eq!(validate_upload(Some("image/png"), None, size), Err(expected));
}

#[rstest]
fn upload_at_the_limit_is_accepted() {
    assert!(validate_upload(Some("application/pdf"), None, MAX_ATTACHMENT_BYTES).is_ok());
}

#[rstest]
fn storage_path_is_scoped_by_ticket() {
    let ticket_id = TicketId::from(Uuid::nil());
    let asset_id = MediaAssetId::from(Uuid::from_u128(1));
    let format = AttachmentFormat::from_content_type("image/gif").expect("gif");
    assert_eq!(
        storage_path(ticket_id, asset_id, format),
        format!("tickets/{}/{}.gif", Uuid::nil(), Uuid::from_u128(1))
    );
}
