//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (repositories, object store, hasher) are implemented by
//! outbound adapters. Driving ports (commands and queries) are implemented
//! by domain services and called by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod account_repository;
mod analytics_query;
mod audit_log_repository;
mod auth_command;
mod credential_hasher;
mod demo_account_seeding;
mod media_asset_repository;
mod message_command;
mod message_repository;
mod object_store;
mod role_repository;
mod staff_invitation;
mod staff_query;
mod ticket_command;
mod ticket_repository;

#[cfg(test)]
pub use account_repository::MockAccountRepository;
pub use account_repository::{
    AccountCredentials, AccountRepository, AccountRepositoryError, FixtureAccountRepository,
    NewAccount,
};
#[cfg(test)]
pub use analytics_query::MockAnalyticsQuery;
pub use analytics_query::AnalyticsQuery;
#[cfg(test)]
pub use audit_log_repository::MockAuditLogRepository;
pub use audit_log_repository::{
    AuditLogRepository, AuditLogRepositoryError, FixtureAuditLogRepository,
};
#[cfg(test)]
pub use auth_command::MockAuthCommand;
pub use auth_command::AuthCommand;
#[cfg(test)]
pub use credential_hasher::MockCredentialHasher;
pub use credential_hasher::{CredentialHasher, CredentialHasherError, FixtureCredentialHasher};
#[cfg(test)]
pub use demo_account_seeding::MockDemoAccountSeeding;
pub use demo_account_seeding::{
    DemoAccountSeeding, DemoAccountStatus, DemoSeedReport, SeededAccount,
};
#[cfg(test)]
pub use media_asset_repository::MockMediaAssetRepository;
pub use media_asset_repository::{
    FixtureMediaAssetRepository, MediaAssetRepository, MediaAssetRepositoryError,
};
#[cfg(test)]
pub use message_command::{MockMessageCommand, MockMessageQuery};
pub use message_command::{AttachmentDownload, AttachmentUpload, MessageCommand, MessageQuery};
#[cfg(test)]
pub use message_repository::MockMessageRepository;
pub use message_repository::{
    FixtureMessageRepository, MessageRepository, MessageRepositoryError,
};
#[cfg(test)]
pub use object_store::MockObjectStore;
pub use object_store::{FixtureObjectStore, ObjectStore, ObjectStoreError};
#[cfg(test)]
pub use role_repository::MockRoleRepository;
pub use role_repository::{FixtureRoleRepository, RoleRepository, RoleRepositoryError};
#[cfg(test)]
pub use staff_invitation::MockStaffInvitation;
pub use staff_invitation::{
    InvitationCaller, InviteStaffRequest, InvitedStaff, StaffInvitation,
};
#[cfg(test)]
pub use staff_query::MockStaffQuery;
pub use staff_query::StaffQuery;
#[cfg(test)]
pub use ticket_command::{MockTicketCommand, MockTicketQuery};
pub use ticket_command::{CreateTicketRequest, CreatedTicket, TicketCommand, TicketQuery};
#[cfg(test)]
pub use ticket_repository::MockTicketRepository;
pub use ticket_repository::{
    FixtureTicketRepository, TicketFilter, TicketRepository, TicketRepositoryError,
};
