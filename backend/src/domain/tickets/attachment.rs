//! Message attachments and the rules of the attachment bucket.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{MessageId, TicketId};

/// Per-file size limit of the attachment bucket (5 MiB).
pub const MAX_ATTACHMENT_BYTES: usize = 5 * 1024 * 1024;

/// Media asset identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaAssetId(Uuid);

impl MediaAssetId {
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for MediaAssetId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl fmt::Display for MediaAssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Broad attachment category stored as `file_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentKind {
    Image,
    Pdf,
}

impl AttachmentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Pdf => "pdf",
        }
    }
}

impl fmt::Display for AttachmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AttachmentKind {
    type Err = AttachmentValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "image" => Ok(Self::Image),
            "pdf" => Ok(Self::Pdf),
            other => Err(AttachmentValidationError::UnsupportedType {
                content_type: other.to_owned(),
            }),
        }
    }
}

/// Rejections raised while validating an upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachmentValidationError {
    Empty,
    TooLarge { max: usize, actual: usize },
    UnsupportedType { content_type: String },
}

impl fmt::Display for AttachmentValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "attachment must not be empty"),
            Self::TooLarge { max, actual } => {
                write!(f, "attachment is {actual} bytes; the limit is {max} bytes")
            }
            Self::UnsupportedType { content_type } => write!(
                f,
                "unsupported attachment type `{content_type}`; only images and PDF files are accepted",
            ),
        }
    }
}

impl std::error::Error for AttachmentValidationError {}

/// Accepted MIME type with its category and file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttachmentFormat {
    pub kind: AttachmentKind,
    pub content_type: &'static str,
    pub extension: &'static str,
}

const FORMATS: [AttachmentFormat; 5] = [
    AttachmentFormat {
        kind: AttachmentKind::Image,
        content_type: "image/png",
        extension: "png",
    },
    AttachmentFormat {
        kind: AttachmentKind::Image,
        content_type: "image/jpeg",
        extension: "jpg",
    },
    AttachmentFormat {
        kind: AttachmentKind::Image,
        content_type: "image/gif",
        extension: "gif",
    },
    AttachmentFormat {
        kind: AttachmentKind::Image,
        content_type: "image/webp",
        extension: "webp",
    },
    AttachmentFormat {
        kind: AttachmentKind::Pdf,
        content_type: "application/pdf",
        extension: "pdf",
    },
];

impl AttachmentFormat {
    /// Resolve a MIME type, ignoring parameters such as `; charset=`.
    pub fn from_content_type(content_type: &str) -> Result<Self, AttachmentValidationError> {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        FORMATS
            .iter()
            .find(|format| format.content_type == essence)
            .copied()
            .ok_or_else(|| AttachmentValidationError::UnsupportedType {
                content_type: content_type.to_owned(),
            })
    }

    /// Guess the format from a file name's extension.
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let (_, extension) = file_name.rsplit_once('.')?;
        let extension = extension.to_ascii_lowercase();
        let extension = if extension == "jpeg" { "jpg".to_owned() } else { extension };
        FORMATS
            .iter()
            .find(|format| format.extension == extension)
            .copied()
    }
}

/// Validate an upload against the bucket rules.
///
/// `declared_type` wins unless it is missing or `application/octet-stream`,
/// in which case the file name extension decides.
///
/// # Examples
/// ```
/// use helpdesk::domain::{validate_upload, AttachmentKind};
///
/// let format = validate_upload(Some("image/png"), None, 1024).unwrap();
/// assert_eq!(format.kind, AttachmentKind::Image);
/// let format = validate_upload(None, Some("notes.PDF"), 10).unwrap();
/// assert_eq!(format.kind, AttachmentKind::Pdf);
/// assert!(validate_upload(Some("text/plain"), None, 10).is_err());
/// ```
pub fn validate_upload(
    declared_type: Option<&str>,
    file_name: Option<&str>,
    byte_size: usize,
) -> Result<AttachmentFormat, AttachmentValidationError> {
    if byte_size == 0 {
        return Err(AttachmentValidationError::Empty);
    }
    if byte_size > MAX_ATTACHMENT_BYTES {
        return Err(AttachmentValidationError::TooLarge {
            max: MAX_ATTACHMENT_BYTES,
            actual: byte_size,
        });
    }

    match declared_type.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) if !value.eq_ignore_ascii_case("application/octet-stream") => {
            AttachmentFormat::from_content_type(value)
        }
        declared => file_name
            .and_then(AttachmentFormat::from_file_name)
            .ok_or_else(|| AttachmentValidationError::UnsupportedType {
                content_type: declared.unwrap_or("application/octet-stream").to_owned(),
            }),
    }
}

/// Object key for an attachment inside the bucket.
pub fn storage_path(ticket_id: TicketId, asset_id: MediaAssetId, format: AttachmentFormat) -> String {
    format!("tickets/{ticket_id}/{asset_id}.{}", format.extension)
}

/// Stored attachment metadata. Assets are append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaAsset {
    pub id: MediaAssetId,
    pub message_id: MessageId,
    pub storage_path: String,
    pub file_type: AttachmentKind,
    pub content_type: String,
    pub byte_size: u64,
    pub sha256: String,
    pub created_at: DateTime<Utc>,
}
