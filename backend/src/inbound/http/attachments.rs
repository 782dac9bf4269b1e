//! Attachment upload and download handlers.
//!
//! ```text
//! POST /api/v1/messages/{id}/attachments?fileName=scan.pdf   (raw body)
//! GET  /api/v1/attachments/{id}
//! ```

use actix_web::http::header::{self, ContentDisposition, DispositionParam, DispositionType};
use actix_web::{HttpRequest, HttpResponse, get, post, web};
use futures_util::StreamExt;
use serde::Deserialize;
use tracing::info;

use crate::domain::ports::AttachmentUpload;
use crate::domain::{Error, MAX_ATTACHMENT_BYTES, MediaAssetId, MessageId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ErrorSchema, MediaAssetSchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_uuid};

/// Query parameters for an attachment upload.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct UploadQuery {
    /// Client-side file name, used to infer the type of generic uploads.
    #[param(example = "receipt.pdf")]
    pub file_name: Option<String>,
}

/// Buffer the request body, giving up one byte past the attachment limit so
/// the domain reports the overflow with the real limit.
async fn read_bounded(mut payload: web::Payload) -> Result<Vec<u8>, Error> {
    let mut bytes = Vec::new();
    while let Some(chunk) = payload.next().await {
        let chunk = chunk.map_err(|err| Error::invalid_request(format!("unreadable body: {err}")))?;
        let room = (MAX_ATTACHMENT_BYTES + 1).saturating_sub(bytes.len());
        bytes.extend(chunk.iter().take(room));
        if bytes.len() > MAX_ATTACHMENT_BYTES {
            break;
        }
    }
    Ok(bytes)
}

fn declared_content_type(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
}

/// Upload an image or PDF against a message.
///
/// The MIME type comes from `Content-Type`; generic or missing types fall
/// back to the `fileName` extension.
#[utoipa::path(
    post,
    path = "/api/v1/messages/{id}/attachments",
    params(("id" = String, Path, description = "Message id"), UploadQuery),
    request_body(content = Vec<u8>, content_type = "application/octet-stream",
        description = "Raw file bytes, at most 5 MiB"),
    responses(
        (status = 201, description = "Attachment stored", body = MediaAssetSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Message not found", body = ErrorSchema),
        (status = 413, description = "File too large", body = ErrorSchema),
        (status = 415, description = "Unsupported file type", body = ErrorSchema),
        (status = 503, description = "Storage unavailable", body = ErrorSchema)
    ),
    tags = ["attachments"],
    operation_id = "uploadAttachment"
)]
#[post("/messages/{id}/attachments")]
pub async fn upload_attachment(
    state: web::Data<HttpState>,
    session: SessionContext,
    req: HttpRequest,
    path: web::Path<String>,
    query: web::Query<UploadQuery>,
    payload: web::Payload,
) -> ApiResult<HttpResponse> {
    let message_id = MessageId::from(parse_uuid(&path, FieldName::new("id"))?);
    let actor = state.actor(&session).await?;
    let upload = AttachmentUpload {
        content_type: declared_content_type(&req),
        file_name: query.into_inner().file_name,
        bytes: read_bounded(payload).await?,
    };
    let asset = state
        .messages
        .attach_file(&actor, &message_id, upload)
        .await?;
    info!(asset_id = %asset.id, message_id = %message_id, "attachment stored");
    Ok(HttpResponse::Created().json(asset))
}

/// Stream an attachment back with its stored content type.
#[utoipa::path(
    get,
    path = "/api/v1/attachments/{id}",
    params(("id" = String, Path, description = "Attachment id")),
    responses(
        (status = 200, description = "Attachment bytes", content_type = "application/octet-stream"),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Attachment not found", body = ErrorSchema)
    ),
    tags = ["attachments"],
    operation_id = "downloadAttachment"
)]
#[get("/attachments/{id}")]
pub async fn download_attachment(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let asset_id = MediaAssetId::from(parse_uuid(&path, FieldName::new("id"))?);
    let actor = state.actor(&session).await?;
    let download = state
        .messages_query
        .download_attachment(&actor, &asset_id)
        .await?;
    let file_name = download
        .asset
        .storage_path
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_owned();
    Ok(HttpResponse::Ok()
        .content_type(download.asset.content_type.as_str())
        .insert_header(ContentDisposition {
            disposition: DispositionType::Inline,
            parameters: vec![DispositionParam::Filename(file_name)],
        })
        .body(download.bytes))
}
