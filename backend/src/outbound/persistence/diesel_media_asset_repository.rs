//! PostgreSQL-backed `MediaAssetRepository` implementation.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{MediaAssetRepository, MediaAssetRepositoryError};
use crate::domain::{MediaAsset, MediaAssetId, MessageId};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::MediaAssetRow;
use super::pool::{DbPool, PoolError};
use super::row_mapping::{RowDecodeError, media_asset_from_row, media_asset_to_row};
use super::schema::media_assets;

/// Diesel-backed implementation of the `MediaAssetRepository` port.
#[derive(Clone)]
pub struct DieselMediaAssetRepository {
    pool: DbPool,
}

impl DieselMediaAssetRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> MediaAssetRepositoryError {
    map_pool_error(error, MediaAssetRepositoryError::connection)
}

fn diesel_error(error: diesel::result::Error) -> MediaAssetRepositoryError {
    map_diesel_error(
        error,
        MediaAssetRepositoryError::query,
        MediaAssetRepositoryError::connection,
    )
}

fn decode_error(error: RowDecodeError) -> MediaAssetRepositoryError {
    MediaAssetRepositoryError::query(error.to_string())
}

#[async_trait]
impl MediaAssetRepository for DieselMediaAssetRepository {
    async fn insert(&self, asset: &MediaAsset) -> Result<(), MediaAssetRepositoryError> {
        let row = media_asset_to_row(asset).map_err(decode_error)?;
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        diesel::insert_into(media_assets::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(())
    }

    async fn find(
        &self,
        id: &MediaAssetId,
    ) -> Result<Option<MediaAsset>, MediaAssetRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row = media_assets::table
            .find(id.as_uuid())
            .select(MediaAssetRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;
        row.map(media_asset_from_row).transpose().map_err(decode_error)
    }

    async fn list_for_messages(
        &self,
        message_ids: &[MessageId],
    ) -> Result<Vec<MediaAsset>, MediaAssetRepositoryError> {
        if message_ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = message_ids.iter().map(|id| *id.as_uuid()).collect();
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let rows = media_assets::table
            .filter(media_assets::message_id.eq_any(&ids))
            .order((media_assets::created_at.asc(), media_assets::id.asc()))
            .select(MediaAssetRow::as_select())
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        rows.into_iter()
            .map(media_asset_from_row)
            .collect::<Result<_, _>>()
            .map_err(decode_error)
    }
}
