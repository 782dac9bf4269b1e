//! Driving ports for messages and attachments.

use async_trait::async_trait;

use crate::domain::{
    Actor, Error, MediaAsset, MediaAssetId, Message, MessageBody, MessageId,
    MessageWithAttachments, TicketId,
};

/// Raw attachment upload as received from a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentUpload {
    /// Declared MIME type, usually the `Content-Type` header.
    pub content_type: Option<String>,
    /// Client-side file name, used when the MIME type is missing or generic.
    pub file_name: Option<String>,
    pub bytes: Vec<u8>,
}

/// Attachment bytes together with their metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentDownload {
    pub asset: MediaAsset,
    pub bytes: Vec<u8>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageCommand: Send + Sync {
    /// Append a message to a readable ticket.
    async fn post_message(
        &self,
        actor: &Actor,
        ticket_id: &TicketId,
        body: MessageBody,
    ) -> Result<Message, Error>;

    /// Store an attachment against a message.
    async fn attach_file(
        &self,
        actor: &Actor,
        message_id: &MessageId,
        upload: AttachmentUpload,
    ) -> Result<MediaAsset, Error>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageQuery: Send + Sync {
    /// Messages on a ticket with their attachments, oldest first.
    async fn list_messages(
        &self,
        actor: &Actor,
        ticket_id: &TicketId,
    ) -> Result<Vec<MessageWithAttachments>, Error>;

    /// Fetch an attachment the caller may see.
    async fn download_attachment(
        &self,
        actor: &Actor,
        asset_id: &MediaAssetId,
    ) -> Result<AttachmentDownload, Error>;
}
