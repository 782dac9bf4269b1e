//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the helpdesk repository ports backed by
//! PostgreSQL via `diesel-async` and `bb8` connection pooling.
//!
//! # Architecture
//!
//! - **Thin adapters**: repositories only translate between Diesel rows and
//!   domain types. Access rules live in the domain services.
//! - **Internal models**: row structs (`models.rs`) and table definitions
//!   (`schema.rs`) never leave this module.
//! - **Strongly typed errors**: every Diesel and pool failure is mapped to
//!   the owning port's error enum.
//!
//! # Example
//!
//! ```ignore
//! use helpdesk::outbound::persistence::{DbPool, DieselTicketRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/helpdesk")).await?;
//! let tickets = DieselTicketRepository::new(pool);
//! ```

mod diesel_account_repository;
mod diesel_audit_log_repository;
mod diesel_error_mapping;
mod diesel_media_asset_repository;
mod diesel_message_repository;
mod diesel_role_repository;
mod diesel_ticket_repository;
mod migrations;
mod models;
mod pool;
mod row_mapping;
mod schema;

pub use diesel_account_repository::DieselAccountRepository;
pub use diesel_audit_log_repository::DieselAuditLogRepository;
pub use diesel_media_asset_repository::DieselMediaAssetRepository;
pub use diesel_message_repository::DieselMessageRepository;
pub use diesel_role_repository::DieselRoleRepository;
pub use diesel_ticket_repository::DieselTicketRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
