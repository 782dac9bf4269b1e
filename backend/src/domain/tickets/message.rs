//! Ticket messages.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{MediaAsset, TicketId, TicketValidationError};
use crate::domain::UserId;

/// Maximum content or transcript length in characters.
pub const MESSAGE_CONTENT_MAX: usize = 10_000;

/// Message identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(Uuid);

impl MessageId {
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for MessageId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How the message was authored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    #[default]
    Text,
    Voice,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Voice => "voice",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown message kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseMessageKindError {
    pub input: String,
}

impl fmt::Display for ParseMessageKindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown message type: {}", self.input)
    }
}

impl std::error::Error for ParseMessageKindError {}

impl FromStr for MessageKind {
    type Err = ParseMessageKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "voice" => Ok(Self::Voice),
            _ => Err(ParseMessageKindError {
                input: s.to_owned(),
            }),
        }
    }
}

/// Validated message payload.
///
/// ## Invariants
/// - `content` is trimmed, non-empty and at most [`MESSAGE_CONTENT_MAX`] chars.
/// - `transcript` is only present on voice messages.
///
/// # Examples
/// ```
/// use helpdesk::domain::{MessageBody, MessageKind};
///
/// let body = MessageBody::new(MessageKind::Voice, "voice note", Some("hello there")).unwrap();
/// assert_eq!(body.transcript(), Some("hello there"));
/// assert!(MessageBody::new(MessageKind::Text, "hi", Some("nope")).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageBody {
    #[serde(rename = "messageType")]
    kind: MessageKind,
    content: String,
    transcript: Option<String>,
}

impl MessageBody {
    pub fn new(
        kind: MessageKind,
        content: &str,
        transcript: Option<&str>,
    ) -> Result<Self, TicketValidationError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(TicketValidationError::EmptyContent);
        }
        if content.chars().count() > MESSAGE_CONTENT_MAX {
            return Err(TicketValidationError::ContentTooLong {
                max: MESSAGE_CONTENT_MAX,
            });
        }

        let transcript = transcript.map(str::trim).filter(|value| !value.is_empty());
        if let Some(value) = transcript {
            if kind != MessageKind::Voice {
                return Err(TicketValidationError::TranscriptRequiresVoice);
            }
            if value.chars().count() > MESSAGE_CONTENT_MAX {
                return Err(TicketValidationError::TranscriptTooLong {
                    max: MESSAGE_CONTENT_MAX,
                });
            }
        }

        Ok(Self {
            kind,
            content: content.to_owned(),
            transcript: transcript.map(str::to_owned),
        })
    }

    /// Shorthand for a text message.
    pub fn text(content: &str) -> Result<Self, TicketValidationError> {
        Self::new(MessageKind::Text, content, None)
    }

    pub fn kind(&self) -> MessageKind {
        self.kind
    }

    pub fn content(&self) -> &str {
        self.content.as_str()
    }

    pub fn transcript(&self) -> Option<&str> {
        self.transcript.as_deref()
    }
}

/// A message posted on a ticket. Messages are append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: MessageId,
    pub ticket_id: TicketId,
    pub sender_id: UserId,
    #[serde(flatten)]
    pub body: MessageBody,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Compose a new message stamped at `now`.
    pub fn compose(
        ticket_id: TicketId,
        sender_id: UserId,
        body: MessageBody,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: MessageId::random(),
            ticket_id,
            sender_id,
            body,
            created_at: now,
        }
    }
}

/// A message with the attachments stored against it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageWithAttachments {
    #[serde(flatten)]
    pub message: Message,
    pub attachments: Vec<MediaAsset>,
}
