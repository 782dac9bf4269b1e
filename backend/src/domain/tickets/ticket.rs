//! Tickets and their lifecycle status.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::TicketValidationError;
use crate::domain::UserId;

/// Maximum subject length in characters.
pub const SUBJECT_MAX: usize = 200;

/// Ticket identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketId(Uuid);

impl TicketId {
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for TicketId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Trimmed, non-empty ticket subject.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TicketSubject(String);

impl TicketSubject {
    pub fn new(raw: impl AsRef<str>) -> Result<Self, TicketValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TicketValidationError::EmptySubject);
        }
        if trimmed.chars().count() > SUBJECT_MAX {
            return Err(TicketValidationError::SubjectTooLong { max: SUBJECT_MAX });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for TicketSubject {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for TicketSubject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<TicketSubject> for String {
    fn from(value: TicketSubject) -> Self {
        value.0
    }
}

impl TryFrom<String> for TicketSubject {
    type Error = TicketValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Ticket lifecycle status.
///
/// The legacy value `resolved` parses as [`TicketStatus::Completed`] and is
/// never written back.
///
/// # Examples
/// ```
/// use helpdesk::domain::TicketStatus;
///
/// assert_eq!("resolved".parse::<TicketStatus>(), Ok(TicketStatus::Completed));
/// assert_eq!(TicketStatus::InProgress.as_str(), "in_progress");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    #[default]
    Pending,
    InProgress,
    #[serde(alias = "resolved")]
    Completed,
}

impl TicketStatus {
    /// All statuses in lifecycle order.
    pub const ALL: [Self; 3] = [Self::Pending, Self::InProgress, Self::Completed];

    /// Returns the database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown ticket status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTicketStatusError {
    pub input: String,
}

impl fmt::Display for ParseTicketStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown ticket status: {}", self.input)
    }
}

impl std::error::Error for ParseTicketStatusError {}

impl FromStr for TicketStatus {
    type Err = ParseTicketStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "in_progress" => Ok(Self::InProgress),
            "completed" | "resolved" => Ok(Self::Completed),
            _ => Err(ParseTicketStatusError {
                input: s.to_owned(),
            }),
        }
    }
}

/// A student-filed support request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: TicketId,
    pub student_id: UserId,
    pub subject: TicketSubject,
    pub status: TicketStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Ticket {
    /// Open a new pending ticket.
    pub fn open(student_id: UserId, subject: TicketSubject, now: DateTime<Utc>) -> Self {
        Self {
            id: TicketId::random(),
            student_id,
            subject,
            status: TicketStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }
}
