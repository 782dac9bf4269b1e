//! Tickets, threaded messages and attachments.

mod attachment;
mod message;
mod ticket;

use std::fmt;

pub use attachment::{
    AttachmentFormat, AttachmentKind, AttachmentValidationError, MAX_ATTACHMENT_BYTES, MediaAsset,
    MediaAssetId, storage_path, validate_upload,
};
pub use message::{
    MESSAGE_CONTENT_MAX, Message, MessageBody, MessageId, MessageKind, MessageWithAttachments,
    ParseMessageKindError,
};
pub use ticket::{ParseTicketStatusError, SUBJECT_MAX, Ticket, TicketId, TicketStatus, TicketSubject};

/// Validation failures for ticket and message payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TicketValidationError {
    EmptySubject,
    SubjectTooLong { max: usize },
    EmptyContent,
    ContentTooLong { max: usize },
    TranscriptRequiresVoice,
    TranscriptTooLong { max: usize },
}

impl fmt::Display for TicketValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptySubject => write!(f, "subject must not be empty"),
            Self::SubjectTooLong { max } => write!(f, "subject must be at most {max} characters"),
            Self::EmptyContent => write!(f, "message content must not be empty"),
            Self::ContentTooLong { max } => {
                write!(f, "message content must be at most {max} characters")
            }
            Self::TranscriptRequiresVoice => {
                write!(f, "a transcript is only allowed on voice messages")
            }
            Self::TranscriptTooLong { max } => {
                write!(f, "transcript must be at most {max} characters")
            }
        }
    }
}

impl std::error::Error for TicketValidationError {}

#[cfg(test)]
mod tests;
