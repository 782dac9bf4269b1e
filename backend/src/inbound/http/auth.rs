//! Authentication API handlers.
//!
//! ```text
//! POST /api/v1/auth/signup {"email":"ada@example.org","name":"Ada","password":"..."}
//! POST /api/v1/auth/login  {"email":"ada@example.org","password":"..."}
//! POST /api/v1/auth/logout
//! ```

use actix_web::{HttpResponse, post, web};
use serde::Deserialize;
use tracing::info;
use zeroize::Zeroizing;

use crate::domain::{LoginCredentials, ProfileWithRoles, SignupRequest};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ErrorSchema, ProfileWithRolesSchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{map_identity_error, map_login_error};

/// Signup request body for `POST /api/v1/auth/signup`.
#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignupBody {
    #[schema(example = "ada@example.org")]
    pub email: String,
    #[schema(example = "Ada Lovelace")]
    pub name: String,
    #[schema(value_type = String, format = Password)]
    pub password: Zeroizing<String>,
}

/// Login request body for `POST /api/v1/auth/login`.
#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginBody {
    #[schema(example = "ada@example.org")]
    pub email: String,
    #[schema(value_type = String, format = Password)]
    pub password: Zeroizing<String>,
}

/// Create a student account and sign it in.
#[utoipa::path(
    post,
    path = "/api/v1/auth/signup",
    request_body = SignupBody,
    responses(
        (status = 201, description = "Account created", body = ProfileWithRolesSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 409, description = "Email already registered", body = ErrorSchema),
        (status = 503, description = "Storage unavailable", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "signup",
    security([])
)]
#[post("/auth/signup")]
pub async fn signup(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<SignupBody>,
) -> ApiResult<HttpResponse> {
    let body = payload.into_inner();
    let request = SignupRequest::try_from_parts(&body.email, &body.name, &body.password)
        .map_err(map_identity_error)?;
    let created = state.auth.signup(request).await?;
    session.persist_user(&created.profile.id)?;
    info!(user_id = %created.profile.id, "student account created");
    Ok(HttpResponse::Created().json(created))
}

/// Authenticate and establish a session.
///
/// Unknown emails and wrong passwords are indistinguishable to the client.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginBody,
    responses(
        (status = 200, description = "Login success", body = ProfileWithRolesSchema,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginBody>,
) -> ApiResult<web::Json<ProfileWithRoles>> {
    let body = payload.into_inner();
    let credentials =
        LoginCredentials::try_from_parts(&body.email, &body.password).map_err(map_login_error)?;
    let user_id = state.auth.login(&credentials).await?;
    session.persist_user(&user_id)?;
    let current = state.auth.current_user(&user_id).await?;
    info!(user_id = %user_id, role = ?current.roles.primary(), "user signed in");
    Ok(web::Json(current))
}

/// End the session. Succeeds whether or not anyone was signed in.
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    responses((status = 204, description = "Session cleared")),
    tags = ["auth"],
    operation_id = "logout"
)]
#[post("/auth/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.clear();
    HttpResponse::NoContent().finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;
    use crate::inbound::http::test_utils::{TEST_PASSWORD, TestBackend, login_cookie};
    use actix_web::http::StatusCode;
    use actix_web::test;
    use rstest::rstest;
    use serde_json::{Value, json};

    #[rstest]
    #[actix_web::test]
    async fn signup_creates_a_signed_in_student() {
        let backend = TestBackend::new();
        let app = test::init_service(backend.app()).await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/auth/signup")
                .set_json(json!({
                    "email": " Grace@Example.org ",
                    "name": "Grace Hopper",
                    "password": "CompilerQueen1"
                }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let cookie = res
            .response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .map(|cookie| cookie.into_owned())
            .expect("session cookie");
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["profile"]["email"], "grace@example.org");
        assert_eq!(body["roles"], json!(["student"]));

        let me = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/users/me")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(me.status(), StatusCode::OK);
    }

    #[rstest]
    #[case(json!({"email": "nope", "name": "A", "password": "longenough"}), "email")]
    #[case(json!({"email": "a@b.org", "name": "  ", "password": "longenough"}), "name")]
    #[case(json!({"email": "a@b.org", "name": "A", "password": "short"}), "password")]
    #[actix_web::test]
    async fn signup_validation_names_the_field(#[case] payload: Value, #[case] field: &str) {
        let backend = TestBackend::new();
        let app = test::init_service(backend.app()).await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/auth/signup")
                .set_json(payload)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["code"], "invalid_request");
        assert_eq!(body["details"]["field"], field);
    }

    #[rstest]
    #[actix_web::test]
    async fn duplicate_signup_conflicts() {
        let backend = TestBackend::new();
        backend.account("taken@example.org", &[Role::Student]).await;
        let app = test::init_service(backend.app()).await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/auth/signup")
                .set_json(json!({
                    "email": "TAKEN@example.org",
                    "name": "Someone",
                    "password": TEST_PASSWORD
                }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[rstest]
    #[case("staff@example.org", "wrong-password")]
    #[case("nobody@example.org", TEST_PASSWORD)]
    #[actix_web::test]
    async fn bad_credentials_are_unauthorised(#[case] email: &str, #[case] password: &str) {
        let backend = TestBackend::new();
        backend.account("staff@example.org", &[Role::Staff]).await;
        let app = test::init_service(backend.app()).await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/auth/login")
                .set_json(json!({ "email": email, "password": password }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert!(res.response().cookies().all(|c| c.name() != "session"));
    }

    #[rstest]
    #[actix_web::test]
    async fn blank_login_fields_are_invalid() {
        let backend = TestBackend::new();
        let app = test::init_service(backend.app()).await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/auth/login")
                .set_json(json!({ "email": "   ", "password": "x" }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["details"]["code"], "empty_email");
    }

    #[rstest]
    #[actix_web::test]
    async fn logout_expires_the_session_cookie() {
        let backend = TestBackend::new();
        backend.account("staff@example.org", &[Role::Staff]).await;
        let app = test::init_service(backend.app()).await;
        let cookie = login_cookie(&app, "staff@example.org").await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/auth/logout")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
        let removal = res
            .response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .expect("removal cookie");
        assert_eq!(removal.value(), "");
    }
}
