//! Port for attachment metadata.

use async_trait::async_trait;

use crate::domain::{MediaAsset, MediaAssetId, MessageId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by media asset repository adapters.
    pub enum MediaAssetRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "media asset repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "media asset repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaAssetRepository: Send + Sync {
    async fn insert(&self, asset: &MediaAsset) -> Result<(), MediaAssetRepositoryError>;

    async fn find(&self, id: &MediaAssetId) -> Result<Option<MediaAsset>, MediaAssetRepositoryError>;

    /// Assets attached to any of `message_ids`, oldest first.
    async fn list_for_messages(
        &self,
        message_ids: &[MessageId],
    ) -> Result<Vec<MediaAsset>, MediaAssetRepositoryError>;
}

/// Fixture implementation holding no assets.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureMediaAssetRepository;

#[async_trait]
impl MediaAssetRepository for FixtureMediaAssetRepository {
    async fn insert(&self, _asset: &MediaAsset) -> Result<(), MediaAssetRepositoryError> {
        Ok(())
    }

    async fn find(
        &self,
        _id: &MediaAssetId,
    ) -> Result<Option<MediaAsset>, MediaAssetRepositoryError> {
        Ok(None)
    }

    async fn list_for_messages(
        &self,
        _message_ids: &[MessageId],
    ) -> Result<Vec<MediaAsset>, MediaAssetRepositoryError> {
        Ok(Vec::new())
    }
}
