//! Translations from port errors into domain errors.
//!
//! Connection failures become `service_unavailable`; everything else a
//! caller cannot fix becomes `internal_error`.

use crate::domain::Error;
use crate::domain::ports::{
    AccountRepositoryError, AuditLogRepositoryError, CredentialHasherError,
    MediaAssetRepositoryError, MessageRepositoryError, ObjectStoreError, RoleRepositoryError,
    TicketRepositoryError,
};

pub(crate) fn map_account_error(error: AccountRepositoryError) -> Error {
    match error {
        AccountRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("account repository unavailable: {message}"))
        }
        AccountRepositoryError::Query { message } => {
            Error::internal(format!("account repository error: {message}"))
        }
        AccountRepositoryError::DuplicateEmail { email } => {
            Error::conflict(format!("an account already exists for {email}"))
        }
    }
}

pub(crate) fn map_role_error(error: RoleRepositoryError) -> Error {
    match error {
        RoleRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("role repository unavailable: {message}"))
        }
        RoleRepositoryError::Query { message } => {
            Error::internal(format!("role repository error: {message}"))
        }
    }
}

pub(crate) fn map_ticket_error(error: TicketRepositoryError) -> Error {
    match error {
        TicketRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("ticket repository unavailable: {message}"))
        }
        TicketRepositoryError::Query { message } => {
            Error::internal(format!("ticket repository error: {message}"))
        }
    }
}

pub(crate) fn map_message_error(error: MessageRepositoryError) -> Error {
    match error {
        MessageRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("message repository unavailable: {message}"))
        }
        MessageRepositoryError::Query { message } => {
            Error::internal(format!("message repository error: {message}"))
        }
    }
}

pub(crate) fn map_media_asset_error(error: MediaAssetRepositoryError) -> Error {
    match error {
        MediaAssetRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("media asset repository unavailable: {message}"))
        }
        MediaAssetRepositoryError::Query { message } => {
            Error::internal(format!("media asset repository error: {message}"))
        }
    }
}

pub(crate) fn map_audit_error(error: AuditLogRepositoryError) -> Error {
    match error {
        AuditLogRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("audit log unavailable: {message}"))
        }
        AuditLogRepositoryError::Query { message } => {
            Error::internal(format!("audit log error: {message}"))
        }
    }
}

pub(crate) fn map_object_store_error(error: ObjectStoreError) -> Error {
    match error {
        ObjectStoreError::NotFound { .. } => Error::not_found("attachment content not found"),
        ObjectStoreError::InvalidPath { path } => {
            Error::internal(format!("invalid attachment path: {path}"))
        }
        ObjectStoreError::Io { message } => {
            Error::internal(format!("attachment storage error: {message}"))
        }
    }
}

pub(crate) fn map_hasher_error(error: CredentialHasherError) -> Error {
    Error::internal(error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    #[case(map_account_error(AccountRepositoryError::connection("down")), ErrorCode::ServiceUnavailable)]
    #[case(map_account_error(AccountRepositoryError::query("bad sql")), ErrorCode::InternalError)]
    #[case(map_account_error(AccountRepositoryError::duplicate_email("a@b.co")), ErrorCode::Conflict)]
    #[case(map_role_error(RoleRepositoryError::connection("down")), ErrorCode::ServiceUnavailable)]
    #[case(map_ticket_error(TicketRepositoryError::query("bad")), ErrorCode::InternalError)]
    #[case(map_message_error(MessageRepositoryError::connection("down")), ErrorCode::ServiceUnavailable)]
    #[case(map_media_asset_error(MediaAssetRepositoryError::query("bad")), ErrorCode::InternalError)]
    #[case(map_audit_error(AuditLogRepositoryError::connection("down")), ErrorCode::ServiceUnavailable)]
    #[case(map_object_store_error(ObjectStoreError::not_found("tickets/x")), ErrorCode::NotFound)]
    #[case(map_object_store_error(ObjectStoreError::io("disk full")), ErrorCode::InternalError)]
    fn port_errors_map_to_codes(#[case] error: Error, #[case] expected: ErrorCode) {
        assert_eq!(error.code(), expected);
    }
}
