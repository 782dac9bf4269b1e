//! Threaded messages and their attachments.
//!
//! Attachment bytes go to the object store first and metadata second; if the
//! metadata insert fails the stored object is removed again.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::domain::access;
use crate::domain::port_errors::{
    map_media_asset_error, map_message_error, map_object_store_error,
};
use crate::domain::ports::{
    AttachmentDownload, AttachmentUpload, MediaAssetRepository, MessageCommand, MessageQuery,
    MessageRepository, ObjectStore, TicketRepository,
};
use crate::domain::ticket_service::load_visible_ticket;
use crate::domain::{
    Actor, AttachmentValidationError, Error, ErrorCode, MediaAsset, MediaAssetId, Message, MessageBody,
    MessageId, MessageWithAttachments, Ticket, TicketId, storage_path, validate_upload,
};

/// Implements the message driving ports.
#[derive(Clone)]
pub struct MessageService<T, M, A, S> {
    tickets: Arc<T>,
    messages: Arc<M>,
    assets: Arc<A>,
    store: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<T, M, A, S> MessageService<T, M, A, S> {
    pub fn new(
        tickets: Arc<T>,
        messages: Arc<M>,
        assets: Arc<A>,
        store: Arc<S>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            tickets,
            messages,
            assets,
            store,
            clock,
        }
    }
}

fn message_not_found() -> Error {
    Error::not_found("message not found")
}

fn attachment_not_found() -> Error {
    Error::not_found("attachment not found")
}

/// Replace a not-found error so callers cannot tell which parent was hidden.
fn hide_parent(error: Error, replacement: fn() -> Error) -> Error {
    if error.code() == ErrorCode::NotFound {
        replacement()
    } else {
        error
    }
}

fn map_upload_error(error: AttachmentValidationError) -> Error {
    let message = error.to_string();
    match error {
        AttachmentValidationError::Empty => Error::invalid_request(message),
        AttachmentValidationError::TooLarge { .. } => Error::payload_too_large(message),
        AttachmentValidationError::UnsupportedType { .. } => Error::unsupported_media_type(message),
    }
}

impl<T, M, A, S> MessageService<T, M, A, S>
where
    T: TicketRepository,
    M: MessageRepository,
    A: MediaAssetRepository,
    S: ObjectStore,
{
    /// Load a message together with its ticket, both visible to `actor`.
    async fn visible_message(
        &self,
        actor: &Actor,
        message_id: &MessageId,
    ) -> Result<(Message, Ticket), Error> {
        let message = self
            .messages
            .find(message_id)
            .await
            .map_err(map_message_error)?
            .ok_or_else(message_not_found)?;
        let ticket = load_visible_ticket(self.tickets.as_ref(), actor, &message.ticket_id)
            .await
            .map_err(|err| hide_parent(err, message_not_found))?;
        Ok((message, ticket))
    }

    async fn discard_object(&self, path: &str) {
        if let Err(err) = self.store.delete(path).await {
            warn!(path, error = %err, "failed to remove orphaned attachment");
        }
    }
}

#[async_trait]
impl<T, M, A, S> MessageCommand for MessageService<T, M, A, S>
where
    T: TicketRepository,
    M: MessageRepository,
    A: MediaAssetRepository,
    S: ObjectStore,
{
    async fn post_message(
        &self,
        actor: &Actor,
        ticket_id: &TicketId,
        body: MessageBody,
    ) -> Result<Message, Error> {
        let ticket = load_visible_ticket(self.tickets.as_ref(), actor, ticket_id).await?;
        if !access::can_post_message(actor, &ticket) {
            return Err(Error::forbidden("you may not post on this ticket"));
        }

        let message = Message::compose(ticket.id, actor.user_id, body, self.clock.utc());
        self.messages
            .insert(&message)
            .await
            .map_err(map_message_error)?;
        info!(ticket_id = %ticket.id, message_id = %message.id, kind = %message.body.kind(), "message posted");
        Ok(message)
    }

    async fn attach_file(
        &self,
        actor: &Actor,
        message_id: &MessageId,
        upload: AttachmentUpload,
    ) -> Result<MediaAsset, Error> {
        let (message, ticket) = self.visible_message(actor, message_id).await?;
        if !access::can_attach_to_message(actor, &ticket, &message.sender_id) {
            return Err(Error::forbidden("only the sender or staff may attach files"));
        }

        let format = validate_upload(
            upload.content_type.as_deref(),
            upload.file_name.as_deref(),
            upload.bytes.len(),
        )
        .map_err(map_upload_error)?;

        let id = MediaAssetId::random();
        let path = storage_path(ticket.id, id, format);
        let asset = MediaAsset {
            id,
            message_id: message.id,
            storage_path: path.clone(),
            file_type: format.kind,
            content_type: format.content_type.to_owned(),
            byte_size: u64::try_from(upload.bytes.len())
                .map_err(|err| Error::internal(format!("attachment size overflow: {err}")))?,
            sha256: hex::encode(Sha256::digest(&upload.bytes)),
            created_at: self.clock.utc(),
        };

        self.store
            .put(&path, &upload.bytes)
            .await
            .map_err(map_object_store_error)?;
        if let Err(err) = self.assets.insert(&asset).await {
            self.discard_object(&path).await;
            return Err(map_media_asset_error(err));
        }

        info!(
            asset_id = %asset.id,
            message_id = %message.id,
            bytes = asset.byte_size,
            file_type = %asset.file_type,
            "attachment stored"
        );
        Ok(asset)
    }
}

#[async_trait]
impl<T, M, A, S> MessageQuery for MessageService<T, M, A, S>
where
    T: TicketRepository,
    M: MessageRepository,
    A: MediaAssetRepository,
    S: ObjectStore,
{
    async fn list_messages(
        &self,
        actor: &Actor,
        ticket_id: &TicketId,
    ) -> Result<Vec<MessageWithAttachments>, Error> {
        let ticket = load_visible_ticket(self.tickets.as_ref(), actor, ticket_id).await?;
        let messages = self
            .messages
            .list_for_ticket(&ticket.id)
            .await
            .map_err(map_message_error)?;
        let ids: Vec<MessageId> = messages.iter().map(|message| message.id).collect();
        let assets = if ids.is_empty() {
            Vec::new()
        } else {
            self.assets
                .list_for_messages(&ids)
                .await
                .map_err(map_media_asset_error)?
        };

        let mut by_message: HashMap<MessageId, Vec<MediaAsset>> = HashMap::new();
        for asset in assets {
            by_message.entry(asset.message_id).or_default().push(asset);
        }
        Ok(messages
            .into_iter()
            .map(|message| MessageWithAttachments {
                attachments: by_message.remove(&message.id).unwrap_or_default(),
                message,
            })
            .collect())
    }

    async fn download_attachment(
        &self,
        actor: &Actor,
        asset_id: &MediaAssetId,
    ) -> Result<AttachmentDownload, Error> {
        let asset = self
            .assets
            .find(asset_id)
            .await
            .map_err(map_media_asset_error)?
            .ok_or_else(attachment_not_found)?;
        self.visible_message(actor, &asset.message_id)
            .await
            .map_err(|err| hide_parent(err, attachment_not_found))?;

        let bytes = self
            .store
            .get(&asset.storage_path)
            .await
            .map_err(map_object_store_error)?;
        Ok(AttachmentDownload { asset, bytes })
    }
}
