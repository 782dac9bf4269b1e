//! Port for the attachment bucket.
//!
//! Keys are relative, `/`-separated paths such as
//! `tickets/{ticket_id}/{asset_id}.png`.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors raised by object store adapters.
    pub enum ObjectStoreError {
        /// The key is absolute, empty or escapes the bucket.
        InvalidPath { path: String } => "invalid object path: {path}",
        /// No object exists under the key.
        NotFound { path: String } => "object not found: {path}",
        /// The backing store failed.
        Io { message: String } => "object store failure: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `bytes` under `path`, replacing nothing: keys are unique per asset.
    async fn put(&self, path: &str, bytes: &[u8]) -> Result<(), ObjectStoreError>;

    async fn get(&self, path: &str) -> Result<Vec<u8>, ObjectStoreError>;

    /// Remove an object. Missing objects are not an error.
    async fn delete(&self, path: &str) -> Result<(), ObjectStoreError>;
}

/// Fixture store that accepts writes and never finds anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureObjectStore;

#[async_trait]
impl ObjectStore for FixtureObjectStore {
    async fn put(&self, _path: &str, _bytes: &[u8]) -> Result<(), ObjectStoreError> {
        Ok(())
    }

    async fn get(&self, path: &str) -> Result<Vec<u8>, ObjectStoreError> {
        Err(ObjectStoreError::not_found(path))
    }

    async fn delete(&self, _path: &str) -> Result<(), ObjectStoreError> {
        Ok(())
    }
}
