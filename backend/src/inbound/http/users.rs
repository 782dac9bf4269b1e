//! User and staff directory handlers.
//!
//! ```text
//! GET /api/v1/users/me
//! GET /api/v1/staff
//! ```

use actix_web::{get, web};

use crate::domain::ProfileWithRoles;
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ErrorSchema, ProfileWithRolesSchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Return the signed-in user's profile and roles.
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    responses(
        (status = 200, description = "Current user", body = ProfileWithRolesSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "currentUser"
)]
#[get("/users/me")]
pub async fn current_user(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<ProfileWithRoles>> {
    let user_id = session.require_user_id()?;
    let current = state.auth.current_user(&user_id).await?;
    Ok(web::Json(current))
}

/// List staff and admin accounts. Admin only.
#[utoipa::path(
    get,
    path = "/api/v1/staff",
    responses(
        (status = 200, description = "Staff and admins", body = [ProfileWithRolesSchema]),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "listStaff"
)]
#[get("/staff")]
pub async fn list_staff(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<ProfileWithRoles>>> {
    let actor = state.actor(&session).await?;
    let staff = state.staff.list_staff(&actor).await?;
    Ok(web::Json(staff))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;
    use crate::inbound::http::test_utils::{TestBackend, login_cookie};
    use actix_web::http::StatusCode;
    use actix_web::test;
    use rstest::rstest;
    use serde_json::Value;

    #[rstest]
    #[actix_web::test]
    async fn current_user_requires_a_session() {
        let backend = TestBackend::new();
        let app = test::init_service(backend.app()).await;

        let res =
            test::call_service(&app, test::TestRequest::get().uri("/api/v1/users/me").to_request())
                .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["code"], "unauthorized");
    }

    #[rstest]
    #[actix_web::test]
    async fn staff_directory_is_admin_only() {
        let backend = TestBackend::new();
        backend.account("admin@example.org", &[Role::Admin]).await;
        backend.account("staff@example.org", &[Role::Staff]).await;
        backend.account("student@example.org", &[Role::Student]).await;
        let app = test::init_service(backend.app()).await;

        let staff_cookie = login_cookie(&app, "staff@example.org").await;
        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/staff")
                .cookie(staff_cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);

        let admin_cookie = login_cookie(&app, "admin@example.org").await;
        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/staff")
                .cookie(admin_cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        let emails: Vec<&str> = body
            .as_array()
            .expect("array")
            .iter()
            .filter_map(|entry| entry["profile"]["email"].as_str())
            .collect();
        assert_eq!(emails.len(), 2);
        assert!(!emails.contains(&"student@example.org"));
    }
}
