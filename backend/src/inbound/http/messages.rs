//! Ticket message handlers.
//!
//! ```text
//! GET  /api/v1/tickets/{id}/messages
//! POST /api/v1/tickets/{id}/messages {"messageType":"voice","content":"...","transcript":"..."}
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::Deserialize;
use tracing::info;

use crate::domain::{MessageBody, MessageKind, MessageWithAttachments};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ErrorSchema, MessageKindSchema, MessageSchema, MessageWithAttachmentsSchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::tickets::parse_ticket_id;
use crate::inbound::http::validation::map_ticket_error;

/// Body for `POST /api/v1/tickets/{id}/messages`.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostMessageBody {
    /// Defaults to `text`.
    #[serde(default)]
    #[schema(value_type = Option<MessageKindSchema>)]
    pub message_type: MessageKind,
    #[schema(example = "Have you tried a different browser?")]
    pub content: String,
    /// Speech-to-text transcript; voice messages only.
    pub transcript: Option<String>,
}

/// List a ticket's messages with their attachments, oldest first.
#[utoipa::path(
    get,
    path = "/api/v1/tickets/{id}/messages",
    params(("id" = String, Path, description = "Ticket id")),
    responses(
        (status = 200, description = "Messages", body = [MessageWithAttachmentsSchema]),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Ticket not found", body = ErrorSchema)
    ),
    tags = ["messages"],
    operation_id = "listMessages"
)]
#[get("/tickets/{id}/messages")]
pub async fn list_messages(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<MessageWithAttachments>>> {
    let ticket_id = parse_ticket_id(&path)?;
    let actor = state.actor(&session).await?;
    let messages = state
        .messages_query
        .list_messages(&actor, &ticket_id)
        .await?;
    Ok(web::Json(messages))
}

/// Post a message on a ticket the caller can read.
#[utoipa::path(
    post,
    path = "/api/v1/tickets/{id}/messages",
    params(("id" = String, Path, description = "Ticket id")),
    request_body = PostMessageBody,
    responses(
        (status = 201, description = "Message stored", body = MessageSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Ticket not found", body = ErrorSchema)
    ),
    tags = ["messages"],
    operation_id = "postMessage"
)]
#[post("/tickets/{id}/messages")]
pub async fn post_message(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<PostMessageBody>,
) -> ApiResult<HttpResponse> {
    let ticket_id = parse_ticket_id(&path)?;
    let body = MessageBody::new(
        payload.message_type,
        &payload.content,
        payload.transcript.as_deref(),
    )
    .map_err(map_ticket_error)?;
    let actor = state.actor(&session).await?;
    let message = state
        .messages
        .post_message(&actor, &ticket_id, body)
        .await?;
    info!(message_id = %message.id, ticket_id = %ticket_id, "message posted");
    Ok(HttpResponse::Created().json(message))
}
