//! Conversions from Diesel rows into domain types.
//!
//! Rows are re-validated on the way out; a row that fails validation means
//! the table was written by something other than this adapter.

use std::str::FromStr;

use crate::domain::{
    AttachmentKind, EmailAddress, MediaAsset, MediaAssetId, Message, MessageBody, MessageId,
    MessageKind, Profile, ProfileName, Role, Ticket, TicketId, TicketStatus, TicketSubject,
    UserId,
};

use super::models::{MediaAssetRow, MessageRow, ProfileRow, TicketRow};

/// A stored row could not be turned back into a domain value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("stored {table} row {id} is invalid: {reason}")]
pub(crate) struct RowDecodeError {
    table: &'static str,
    id: String,
    reason: String,
}

impl RowDecodeError {
    fn new(table: &'static str, id: impl ToString, reason: impl ToString) -> Self {
        Self {
            table,
            id: id.to_string(),
            reason: reason.to_string(),
        }
    }
}

pub(crate) fn profile_from_row(row: ProfileRow) -> Result<Profile, RowDecodeError> {
    let decode = |reason: String| RowDecodeError::new("profiles", row.id, reason);
    Ok(Profile {
        id: UserId::from(row.id),
        name: ProfileName::new(&row.name).map_err(|err| decode(err.to_string()))?,
        email: EmailAddress::new(&row.email).map_err(|err| decode(err.to_string()))?,
        created_at: row.created_at,
    })
}

pub(crate) fn role_from_str(user_id: uuid::Uuid, raw: &str) -> Result<Role, RowDecodeError> {
    Role::from_str(raw).map_err(|err| RowDecodeError::new("user_roles", user_id, err))
}

pub(crate) fn ticket_from_row(row: TicketRow) -> Result<Ticket, RowDecodeError> {
    let decode = |reason: String| RowDecodeError::new("tickets", row.id, reason);
    Ok(Ticket {
        id: TicketId::from(row.id),
        student_id: UserId::from(row.student_id),
        subject: TicketSubject::new(&row.subject).map_err(|err| decode(err.to_string()))?,
        status: TicketStatus::from_str(&row.status).map_err(|err| decode(err.to_string()))?,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

pub(crate) fn ticket_to_row(ticket: &Ticket) -> TicketRow {
    TicketRow {
        id: *ticket.id.as_uuid(),
        student_id: *ticket.student_id.as_uuid(),
        subject: ticket.subject.as_ref().to_owned(),
        status: ticket.status.as_str().to_owned(),
        created_at: ticket.created_at,
        updated_at: ticket.updated_at,
    }
}

pub(crate) fn message_from_row(row: MessageRow) -> Result<Message, RowDecodeError> {
    let decode = |reason: String| RowDecodeError::new("ticket_messages", row.id, reason);
    let kind = MessageKind::from_str(&row.message_type).map_err(|err| decode(err.to_string()))?;
    let body = MessageBody::new(kind, &row.content, row.transcript.as_deref())
        .map_err(|err| decode(err.to_string()))?;
    Ok(Message {
        id: MessageId::from(row.id),
        ticket_id: TicketId::from(row.ticket_id),
        sender_id: UserId::from(row.sender_id),
        body,
        created_at: row.created_at,
    })
}

pub(crate) fn message_to_row(message: &Message) -> MessageRow {
    MessageRow {
        id: *message.id.as_uuid(),
        ticket_id: *message.ticket_id.as_uuid(),
        sender_id: *message.sender_id.as_uuid(),
        message_type: message.body.kind().as_str().to_owned(),
        content: message.body.content().to_owned(),
        transcript: message.body.transcript().map(str::to_owned),
        created_at: message.created_at,
    }
}

pub(crate) fn media_asset_from_row(row: MediaAssetRow) -> Result<MediaAsset, RowDecodeError> {
    let decode = |reason: String| RowDecodeError::new("media_assets", row.id, reason);
    let file_type = match row.file_type.as_str() {
        "image" => AttachmentKind::Image,
        "pdf" => AttachmentKind::Pdf,
        other => return Err(decode(format!("unknown file type {other}"))),
    };
    Ok(MediaAsset {
        id: MediaAssetId::from(row.id),
        message_id: MessageId::from(row.message_id),
        storage_path: row.storage_path,
        file_type,
        content_type: row.content_type,
        byte_size: u64::try_from(row.byte_size).map_err(|err| decode(err.to_string()))?,
        sha256: row.sha256,
        created_at: row.created_at,
    })
}

pub(crate) fn media_asset_to_row(asset: &MediaAsset) -> Result<MediaAssetRow, RowDecodeError> {
    Ok(MediaAssetRow {
        id: *asset.id.as_uuid(),
        message_id: *asset.message_id.as_uuid(),
        storage_path: asset.storage_path.clone(),
        file_type: asset.file_type.as_str().to_owned(),
        content_type: asset.content_type.clone(),
        byte_size: i64::try_from(asset.byte_size)
            .map_err(|err| RowDecodeError::new("media_assets", asset.id, err))?,
        sha256: asset.sha256.clone(),
        created_at: asset.created_at,
    })
}
