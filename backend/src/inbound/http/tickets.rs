//! Ticket API handlers.
//!
//! ```text
//! GET   /api/v1/tickets?status=pending
//! POST  /api/v1/tickets {"subject":"VPN down","message":"Since Monday"}
//! GET   /api/v1/tickets/{id}
//! PATCH /api/v1/tickets/{id}/status {"status":"in_progress"}
//! ```

use actix_web::{HttpResponse, get, patch, post, web};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::ports::CreateTicketRequest;
use crate::domain::{Message, MessageBody, Ticket, TicketId, TicketStatus, TicketSubject};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ErrorSchema, MessageSchema, TicketSchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, invalid_value_error, map_ticket_error, parse_uuid,
};

const STATUS_FIELD: FieldName = FieldName::new("status");
const TICKET_ID_FIELD: FieldName = FieldName::new("id");

/// Query string for `GET /api/v1/tickets`.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TicketListQuery {
    /// Only return tickets in this status (`resolved` is accepted for `completed`).
    pub status: Option<String>,
}

/// Body for `POST /api/v1/tickets`.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTicketBody {
    #[schema(example = "Cannot log in to the VPN")]
    pub subject: String,
    /// Optional opening message stored with the ticket.
    #[schema(example = "It fails with error 809 since Monday.")]
    pub message: Option<String>,
}

/// Body for `PATCH /api/v1/tickets/{id}/status`.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct UpdateStatusBody {
    #[schema(example = "in_progress")]
    pub status: String,
}

/// Response for ticket creation.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatedTicketResponse {
    #[schema(value_type = TicketSchema)]
    pub ticket: Ticket,
    #[schema(value_type = Option<MessageSchema>)]
    pub message: Option<Message>,
}

pub(crate) fn parse_ticket_id(raw: &str) -> Result<TicketId, crate::domain::Error> {
    parse_uuid(raw, TICKET_ID_FIELD).map(TicketId::from)
}

fn parse_status(raw: &str) -> Result<TicketStatus, crate::domain::Error> {
    raw.trim()
        .parse()
        .map_err(|err: crate::domain::ParseTicketStatusError| {
            invalid_value_error(STATUS_FIELD, err.to_string())
        })
}

/// List tickets visible to the caller, newest first.
///
/// Students see their own tickets; staff and admins see every ticket.
#[utoipa::path(
    get,
    path = "/api/v1/tickets",
    params(TicketListQuery),
    responses(
        (status = 200, description = "Tickets", body = [TicketSchema]),
        (status = 400, description = "Unknown status", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["tickets"],
    operation_id = "listTickets"
)]
#[get("/tickets")]
pub async fn list_tickets(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<TicketListQuery>,
) -> ApiResult<web::Json<Vec<Ticket>>> {
    let status = query
        .status
        .as_deref()
        .filter(|raw| !raw.trim().is_empty())
        .map(parse_status)
        .transpose()?;
    let actor = state.actor(&session).await?;
    let tickets = state.tickets_query.list_tickets(&actor, status).await?;
    Ok(web::Json(tickets))
}

/// Open a ticket. Students only.
#[utoipa::path(
    post,
    path = "/api/v1/tickets",
    request_body = CreateTicketBody,
    responses(
        (status = 201, description = "Ticket created", body = CreatedTicketResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Only students open tickets", body = ErrorSchema)
    ),
    tags = ["tickets"],
    operation_id = "createTicket"
)]
#[post("/tickets")]
pub async fn create_ticket(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateTicketBody>,
) -> ApiResult<HttpResponse> {
    let body = payload.into_inner();
    let subject = TicketSubject::new(&body.subject).map_err(map_ticket_error)?;
    let opening_message = body
        .message
        .as_deref()
        .filter(|content| !content.trim().is_empty())
        .map(MessageBody::text)
        .transpose()
        .map_err(map_ticket_error)?;

    let actor = state.actor(&session).await?;
    let created = state
        .tickets
        .create_ticket(
            &actor,
            CreateTicketRequest {
                subject,
                opening_message,
            },
        )
        .await?;
    info!(ticket_id = %created.ticket.id, student_id = %actor.user_id, "ticket opened");
    Ok(HttpResponse::Created().json(CreatedTicketResponse {
        ticket: created.ticket,
        message: created.opening_message,
    }))
}

/// Fetch one ticket. Tickets the caller may not read are reported as missing.
#[utoipa::path(
    get,
    path = "/api/v1/tickets/{id}",
    params(("id" = String, Path, description = "Ticket id")),
    responses(
        (status = 200, description = "Ticket", body = TicketSchema),
        (status = 400, description = "Malformed id", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["tickets"],
    operation_id = "getTicket"
)]
#[get("/tickets/{id}")]
pub async fn get_ticket(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Ticket>> {
    let ticket_id = parse_ticket_id(&path)?;
    let actor = state.actor(&session).await?;
    let ticket = state.tickets_query.get_ticket(&actor, &ticket_id).await?;
    Ok(web::Json(ticket))
}

/// Move a ticket to a new status. Staff and admins only.
#[utoipa::path(
    patch,
    path = "/api/v1/tickets/{id}/status",
    params(("id" = String, Path, description = "Ticket id")),
    request_body = UpdateStatusBody,
    responses(
        (status = 200, description = "Updated ticket", body = TicketSchema),
        (status = 400, description = "Unknown status", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["tickets"],
    operation_id = "updateTicketStatus"
)]
#[patch("/tickets/{id}/status")]
pub async fn update_ticket_status(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<UpdateStatusBody>,
) -> ApiResult<web::Json<Ticket>> {
    let ticket_id = parse_ticket_id(&path)?;
    let status = parse_status(&payload.status)?;
    let actor = state.actor(&session).await?;
    let ticket = state
        .tickets
        .update_status(&actor, &ticket_id, status)
        .await?;
    info!(ticket_id = %ticket.id, status = %ticket.status, by = %actor.user_id, "ticket status changed");
    Ok(web::Json(ticket))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;
    use crate::inbound::http::test_utils::{TestBackend, login_cookie};
    use actix_web::cookie::Cookie;
    use actix_web::dev::{Service, ServiceResponse};
    use actix_web::http::StatusCode;
    use actix_web::test;
    use rstest::rstest;
    use serde_json::{Value, json};

    async fn open_ticket(
        app: &impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
        cookie: &Cookie<'static>,
        subject: &str,
    ) -> Value {
        let res = test::call_service(
            app,
            test::TestRequest::post()
                .uri("/api/v1/tickets")
                .cookie(cookie.clone())
                .set_json(json!({ "subject": subject, "message": "Details follow" }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        test::read_body_json(res).await
    }

    #[rstest]
    #[actix_web::test]
    async fn students_open_tickets_with_an_opening_message() {
        let backend = TestBackend::new();
        backend.account("sam@example.org", &[Role::Student]).await;
        let app = test::init_service(backend.app()).await;
        let cookie = login_cookie(&app, "sam@example.org").await;

        let created = open_ticket(&app, &cookie, "  Printer jam  ").await;
        assert_eq!(created["ticket"]["subject"], "Printer jam");
        assert_eq!(created["ticket"]["status"], "pending");
        assert_eq!(created["message"]["content"], "Details follow");
        assert_eq!(created["message"]["messageType"], "text");
    }

    #[rstest]
    #[actix_web::test]
    async fn staff_cannot_open_tickets() {
        let backend = TestBackend::new();
        backend.account("staff@example.org", &[Role::Staff]).await;
        let app = test::init_service(backend.app()).await;
        let cookie = login_cookie(&app, "staff@example.org").await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/tickets")
                .cookie(cookie)
                .set_json(json!({ "subject": "Not mine" }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[rstest]
    #[actix_web::test]
    async fn other_students_tickets_are_hidden() {
        let backend = TestBackend::new();
        backend.account("owner@example.org", &[Role::Student]).await;
        backend.account("other@example.org", &[Role::Student]).await;
        let app = test::init_service(backend.app()).await;
        let owner = login_cookie(&app, "owner@example.org").await;
        let other = login_cookie(&app, "other@example.org").await;

        let created = open_ticket(&app, &owner, "Lost card").await;
        let id = created["ticket"]["id"].as_str().expect("ticket id").to_owned();

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri(&format!("/api/v1/tickets/{id}"))
                .cookie(other.clone())
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/tickets")
                .cookie(other)
                .to_request(),
        )
        .await;
        let listed: Value = test::read_body_json(res).await;
        assert_eq!(listed, json!([]));
    }

    #[rstest]
    #[actix_web::test]
    async fn staff_move_tickets_through_the_lifecycle() {
        let backend = TestBackend::new();
        backend.account("sam@example.org", &[Role::Student]).await;
        backend.account("staff@example.org", &[Role::Staff]).await;
        let app = test::init_service(backend.app()).await;
        let student = login_cookie(&app, "sam@example.org").await;
        let staff = login_cookie(&app, "staff@example.org").await;
        let created = open_ticket(&app, &student, "Wi-Fi").await;
        let id = created["ticket"]["id"].as_str().expect("ticket id").to_owned();

        let forbidden = test::call_service(
            &app,
            test::TestRequest::patch()
                .uri(&format!("/api/v1/tickets/{id}/status"))
                .cookie(student)
                .set_json(json!({ "status": "completed" }))
                .to_request(),
        )
        .await;
        assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);

        let res = test::call_service(
            &app,
            test::TestRequest::patch()
                .uri(&format!("/api/v1/tickets/{id}/status"))
                .cookie(staff.clone())
                .set_json(json!({ "status": "resolved" }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["status"], "completed");

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/tickets?status=pending")
                .cookie(staff)
                .to_request(),
        )
        .await;
        let pending: Value = test::read_body_json(res).await;
        assert_eq!(pending, json!([]));
    }

    #[rstest]
    #[case("/api/v1/tickets/not-a-uuid", "invalid_uuid")]
    #[case("/api/v1/tickets?status=archived", "invalid_value")]
    #[actix_web::test]
    async fn malformed_input_is_rejected(#[case] uri: &str, #[case] code: &str) {
        let backend = TestBackend::new();
        backend.account("staff@example.org", &[Role::Staff]).await;
        let app = test::init_service(backend.app()).await;
        let cookie = login_cookie(&app, "staff@example.org").await;

        let res = test::call_service(
            &app,
            test::TestRequest::get().uri(uri).cookie(cookie).to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["details"]["code"], code);
    }
}
