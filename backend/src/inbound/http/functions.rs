//! Privileged edge functions served under `/functions/v1`.
//!
//! ```text
//! POST /functions/v1/invite-staff {"email":"...","name":"...","password":"...","role":"staff"}
//! POST /functions/v1/seed-demo-accounts
//! ```
//!
//! Both are reachable cross-origin and record the caller's IP address in the
//! audit log.

use std::net::IpAddr;

use actix_cors::Cors;
use actix_web::http::{Method, header};
use actix_web::{HttpRequest, HttpResponse, post, web};
use serde_json::Value;
use tracing::info;
use zeroize::Zeroizing;

use crate::domain::ports::{DemoSeedReport, InvitationCaller, InviteStaffRequest, InvitedStaff};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{DemoSeedReportSchema, ErrorSchema, InvitedStaffSchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::session_config::SESSION_COOKIE;
use crate::inbound::http::state::HttpState;

const FORWARDED_FOR: &str = "x-forwarded-for";

/// CORS policy for the edge functions: any origin, `POST` and preflight.
pub fn cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allowed_methods([Method::POST, Method::OPTIONS])
        .allowed_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .max_age(3600)
}

/// Client address: the first `X-Forwarded-For` hop, else the peer address.
pub(crate) fn client_ip(req: &HttpRequest) -> Option<IpAddr> {
    let forwarded = req
        .headers()
        .get(FORWARDED_FOR)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .and_then(|hop| hop.trim().parse::<IpAddr>().ok());
    forwarded.or_else(|| req.peer_addr().map(|addr| addr.ip()))
}

/// Invitation body, as documented. The handler reads the raw bytes instead
/// (see [`invite_request`]) so that no body can be rejected before the caller
/// is checked and the outcome audited.
#[derive(utoipa::ToSchema)]
pub struct InviteStaffBody {
    #[schema(example = "new.staff@example.org")]
    pub email: String,
    #[schema(example = "Morgan Reyes")]
    pub name: String,
    #[schema(value_type = String, format = Password)]
    pub password: Zeroizing<String>,
    #[schema(example = "staff")]
    pub role: String,
}

/// Classify the caller for the invitation audit trail.
///
/// The session middleware drops a cookie it cannot decrypt, so a presented
/// but unreadable cookie would otherwise look like no credentials at all.
fn invitation_caller(session: &SessionContext, req: &HttpRequest) -> InvitationCaller {
    match session.invitation_caller() {
        InvitationCaller::Anonymous if req.cookie(SESSION_COOKIE).is_some() => {
            InvitationCaller::Unverifiable {
                reason: "unreadable session cookie".to_owned(),
            }
        }
        caller => caller,
    }
}

/// Read the invitation fields leniently from `raw`.
///
/// Malformed JSON and missing fields become empty strings and non-string
/// values their JSON text; the domain then rejects them with an audit entry.
fn invite_request(raw: &[u8]) -> InviteStaffRequest {
    let body: Value = serde_json::from_slice(raw).unwrap_or(Value::Null);
    let field = |name: &str| match body.get(name) {
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    };
    InviteStaffRequest {
        email: field("email"),
        name: field("name"),
        password: Zeroizing::new(field("password")),
        role: field("role"),
    }
}

/// Create a staff or admin account on behalf of the signed-in caller.
#[utoipa::path(
    post,
    path = "/functions/v1/invite-staff",
    request_body = InviteStaffBody,
    responses(
        (status = 201, description = "Account invited", body = InvitedStaffSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Missing or unreadable session", body = ErrorSchema),
        (status = 403, description = "Caller may not invite this role", body = ErrorSchema),
        (status = 409, description = "Email already registered", body = ErrorSchema)
    ),
    tags = ["functions"],
    operation_id = "inviteStaff"
)]
#[post("/invite-staff")]
pub async fn invite_staff(
    state: web::Data<HttpState>,
    session: SessionContext,
    req: HttpRequest,
    payload: web::Bytes,
) -> ApiResult<HttpResponse> {
    let caller = invitation_caller(&session, &req);
    let request = invite_request(&payload);
    let invited: InvitedStaff = state
        .invitations
        .invite(caller, request, client_ip(&req))
        .await?;
    info!(user_id = %invited.user_id, role = %invited.role, "staff account invited");
    Ok(HttpResponse::Created().json(invited))
}

/// Ensure the demo admin and staff accounts exist.
#[utoipa::path(
    post,
    path = "/functions/v1/seed-demo-accounts",
    responses(
        (status = 200, description = "Seeding report", body = DemoSeedReportSchema),
        (status = 503, description = "Storage unavailable", body = ErrorSchema)
    ),
    tags = ["functions"],
    operation_id = "seedDemoAccounts",
    security([])
)]
#[post("/seed-demo-accounts")]
pub async fn seed_demo_accounts(
    state: web::Data<HttpState>,
    req: HttpRequest,
) -> ApiResult<web::Json<DemoSeedReport>> {
    let report = state.demo_accounts.seed(client_ip(&req)).await?;
    Ok(web::Json(report))
}
