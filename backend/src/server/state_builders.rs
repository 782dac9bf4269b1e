//! Builders for the HTTP state from server configuration.
//!
//! With a database pool every repository port is served by its Diesel
//! adapter; without one they share an [`InMemoryStore`]. Attachment bytes
//! always live under the configured storage root.

use std::sync::Arc;

use actix_web::web;
use mockable::DefaultClock;
use tracing::{info, warn};

use helpdesk::domain::ports::ObjectStoreError;
use helpdesk::inbound::http::state::{Adapters, HttpState, HttpStatePorts};
use helpdesk::outbound::crypto::Argon2CredentialHasher;
use helpdesk::outbound::memory::InMemoryStore;
use helpdesk::outbound::persistence::{
    DbPool, DieselAccountRepository, DieselAuditLogRepository, DieselMediaAssetRepository,
    DieselMessageRepository, DieselRoleRepository, DieselTicketRepository,
};
use helpdesk::outbound::storage::FilesystemObjectStore;

use super::ServerConfig;

fn diesel_ports(
    pool: &DbPool,
    objects: Arc<FilesystemObjectStore>,
    hasher: Arc<Argon2CredentialHasher>,
) -> HttpStatePorts {
    HttpStatePorts::from_adapters(
        Adapters {
            accounts: Arc::new(DieselAccountRepository::new(pool.clone())),
            roles: Arc::new(DieselRoleRepository::new(pool.clone())),
            tickets: Arc::new(DieselTicketRepository::new(pool.clone())),
            messages: Arc::new(DieselMessageRepository::new(pool.clone())),
            assets: Arc::new(DieselMediaAssetRepository::new(pool.clone())),
            audit: Arc::new(DieselAuditLogRepository::new(pool.clone())),
            objects,
            hasher,
        },
        Arc::new(DefaultClock),
    )
}

fn in_memory_ports(
    objects: Arc<FilesystemObjectStore>,
    hasher: Arc<Argon2CredentialHasher>,
) -> HttpStatePorts {
    let store = Arc::new(InMemoryStore::new());
    HttpStatePorts::from_adapters(
        Adapters {
            accounts: store.clone(),
            roles: store.clone(),
            tickets: store.clone(),
            messages: store.clone(),
            assets: store.clone(),
            audit: store,
            objects,
            hasher,
        },
        Arc::new(DefaultClock),
    )
}

/// Build the shared HTTP state for `config`.
///
/// # Errors
///
/// Returns [`ObjectStoreError`] when the storage root cannot be opened.
pub fn build_http_state(config: &ServerConfig) -> Result<web::Data<HttpState>, ObjectStoreError> {
    let objects = Arc::new(FilesystemObjectStore::open(config.storage_root())?);
    let hasher = Arc::new(Argon2CredentialHasher::default());
    let ports = match &config.db_pool {
        Some(pool) => {
            info!(storage_root = %config.storage_root().display(), "using PostgreSQL repositories");
            diesel_ports(pool, objects, hasher)
        }
        None => {
            warn!("no database configured; accounts and tickets are kept in memory");
            in_memory_ports(objects, hasher)
        }
    };
    Ok(web::Data::new(HttpState::new(ports)))
}
