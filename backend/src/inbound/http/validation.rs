//! Shared validation helpers for inbound HTTP adapters.
//!
//! Domain validation errors are turned into `invalid_request` responses with
//! a `details` object naming the offending field and a stable code.

use actix_web::error::{JsonPayloadError, QueryPayloadError};
use actix_web::web::{JsonConfig, QueryConfig};
use serde_json::json;
use uuid::Uuid;

use crate::domain::{
    Error, IdentityValidationError, LoginValidationError, TicketValidationError,
    WindowOutOfRange,
};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    InvalidUuid,
    InvalidValue,
    InvalidBody,
    InvalidQuery,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidValue => "invalid_value",
            ErrorCode::InvalidBody => "invalid_body",
            ErrorCode::InvalidQuery => "invalid_query",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &str {
        self.0
    }
}

fn field_error(field: &str, message: impl Into<String>, code: &str) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field,
        "code": code,
    }))
}

pub(crate) fn invalid_uuid_error(field: FieldName, value: &str) -> Error {
    let field = field.as_str();
    Error::invalid_request(format!("{field} must be a valid UUID")).with_details(json!({
        "field": field,
        "value": value,
        "code": ErrorCode::InvalidUuid.as_str(),
    }))
}

pub(crate) fn invalid_value_error(field: FieldName, message: impl Into<String>) -> Error {
    field_error(field.as_str(), message, ErrorCode::InvalidValue.as_str())
}

pub(crate) fn parse_uuid(value: &str, field: FieldName) -> Result<Uuid, Error> {
    Uuid::parse_str(value).map_err(|_| invalid_uuid_error(field, value))
}

pub(crate) fn map_identity_error(error: IdentityValidationError) -> Error {
    let (field, code) = match &error {
        IdentityValidationError::InvalidUserId => ("id", "invalid_user_id"),
        IdentityValidationError::EmptyEmail => ("email", "empty_email"),
        IdentityValidationError::InvalidEmail => ("email", "invalid_email"),
        IdentityValidationError::EmailTooLong { .. } => ("email", "email_too_long"),
        IdentityValidationError::EmptyProfileName => ("name", "empty_name"),
        IdentityValidationError::ProfileNameTooLong { .. } => ("name", "name_too_long"),
        IdentityValidationError::PasswordTooShort { .. } => ("password", "password_too_short"),
        IdentityValidationError::PasswordTooLong { .. } => ("password", "password_too_long"),
    };
    field_error(field, error.to_string(), code)
}

pub(crate) fn map_login_error(error: LoginValidationError) -> Error {
    let (field, code) = match &error {
        LoginValidationError::EmptyEmail => ("email", "empty_email"),
        LoginValidationError::EmptyPassword => ("password", "empty_password"),
    };
    field_error(field, error.to_string(), code)
}

pub(crate) fn map_ticket_error(error: TicketValidationError) -> Error {
    let (field, code) = match &error {
        TicketValidationError::EmptySubject => ("subject", "empty_subject"),
        TicketValidationError::SubjectTooLong { .. } => ("subject", "subject_too_long"),
        TicketValidationError::EmptyContent => ("content", "empty_content"),
        TicketValidationError::ContentTooLong { .. } => ("content", "content_too_long"),
        TicketValidationError::TranscriptRequiresVoice => {
            ("transcript", "transcript_requires_voice")
        }
        TicketValidationError::TranscriptTooLong { .. } => ("transcript", "transcript_too_long"),
    };
    field_error(field, error.to_string(), code)
}

pub(crate) fn map_window_error(error: WindowOutOfRange) -> Error {
    field_error("days", error.to_string(), "days_out_of_range")
}

/// JSON extractor configuration reporting malformed bodies in the error envelope.
pub fn json_config() -> JsonConfig {
    JsonConfig::default().error_handler(|error: JsonPayloadError, _req| {
        Error::invalid_request(format!("invalid JSON body: {error}"))
            .with_details(json!({ "code": ErrorCode::InvalidBody.as_str() }))
            .into()
    })
}

/// Query extractor configuration reporting malformed query strings in the error envelope.
pub fn query_config() -> QueryConfig {
    QueryConfig::default().error_handler(|error: QueryPayloadError, _req| {
        Error::invalid_request(format!("invalid query string: {error}"))
            .with_details(json!({ "code": ErrorCode::InvalidQuery.as_str() }))
            .into()
    })
}
