//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! Provides a thin wrapper around Actix sessions so handlers only deal with
//! domain-friendly operations such as persisting or retrieving a user id.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::domain::ports::InvitationCaller;
use crate::domain::{Error, UserId};

pub(crate) const USER_ID_KEY: &str = "user_id";

/// Outcome of reading the user id stored in the session cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
enum StoredUser {
    Absent,
    Unreadable(String),
    Present(UserId),
}

/// Newtype wrapper that exposes higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Persist the authenticated user's id in the session cookie.
    ///
    /// The session is renewed first so a pre-login cookie is never reused.
    pub fn persist_user(&self, user_id: &UserId) -> Result<(), Error> {
        self.0.renew();
        self.0
            .insert(USER_ID_KEY, user_id.to_string())
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Drop every value held in the session and expire the cookie.
    pub fn clear(&self) {
        self.0.purge();
    }

    fn stored_user(&self) -> StoredUser {
        match self.0.get::<String>(USER_ID_KEY) {
            Ok(None) => StoredUser::Absent,
            Ok(Some(raw)) => match UserId::new(&raw) {
                Ok(id) => StoredUser::Present(id),
                Err(error) => StoredUser::Unreadable(error.to_string()),
            },
            Err(error) => StoredUser::Unreadable(error.to_string()),
        }
    }

    /// Fetch the current user id from the session, if present and readable.
    pub fn user_id(&self) -> Option<UserId> {
        match self.stored_user() {
            StoredUser::Present(id) => Some(id),
            StoredUser::Absent => None,
            StoredUser::Unreadable(reason) => {
                warn!(%reason, "invalid user id in session cookie");
                None
            }
        }
    }

    /// Require an authenticated user id or return `401 Unauthorized`.
    pub fn require_user_id(&self) -> Result<UserId, Error> {
        self.user_id()
            .ok_or_else(|| Error::unauthorized("login required"))
    }

    /// Classify the caller for the staff invitation flow, which audits
    /// anonymous and unreadable sessions differently.
    pub fn invitation_caller(&self) -> InvitationCaller {
        match self.stored_user() {
            StoredUser::Absent => InvitationCaller::Anonymous,
            StoredUser::Unreadable(reason) => InvitationCaller::Unverifiable { reason },
            StoredUser::Present(id) => InvitationCaller::User(id),
        }
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test, web};

    const USER: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

    fn session_test_app() -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .wrap(crate::inbound::http::test_utils::test_session_middleware())
            .route(
                "/set",
                web::get().to(|session: SessionContext| async move {
                    let id = UserId::new(USER).expect("fixture id");
                    session.persist_user(&id)?;
                    Ok::<_, Error>(HttpResponse::Ok())
                }),
            )
            .route(
                "/set-invalid",
                web::get().to(|session: Session| async move {
                    session
                        .insert(USER_ID_KEY, "not-a-uuid")
                        .expect("set invalid user id");
                    HttpResponse::Ok()
                }),
            )
            .route(
                "/require",
                web::get().to(|session: SessionContext| async move {
                    let id = session.require_user_id()?;
                    Ok::<_, Error>(HttpResponse::Ok().body(id.to_string()))
                }),
            )
            .route(
                "/caller",
                web::get().to(|session: SessionContext| async move {
                    HttpResponse::Ok().body(format!("{:?}", session.invitation_caller()))
                }),
            )
    }

    async fn cookie_from(
        app: &impl actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
        >,
        uri: &str,
    ) -> actix_web::cookie::Cookie<'static> {
        let res = test::call_service(app, test::TestRequest::get().uri(uri).to_request()).await;
        res.response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .map(|cookie| cookie.into_owned())
            .expect("session cookie set")
    }

    #[actix_web::test]
    async fn round_trips_user_id() {
        let app = test::init_service(session_test_app()).await;
        let cookie = cookie_from(&app, "/set").await;

        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/require").cookie(cookie).to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(test::read_body(res).await, USER);
    }

    #[actix_web::test]
    async fn missing_user_is_unauthorised_and_anonymous() {
        let app = test::init_service(session_test_app()).await;

        let res =
            test::call_service(&app, test::TestRequest::get().uri("/require").to_request()).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

        let res =
            test::call_service(&app, test::TestRequest::get().uri("/caller").to_request()).await;
        assert_eq!(test::read_body(res).await, "Anonymous");
    }

    #[actix_web::test]
    async fn tampered_user_id_is_unauthorised_but_unverifiable_for_invites() {
        let app = test::init_service(session_test_app()).await;
        let cookie = cookie_from(&app, "/set-invalid").await;

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/require")
                .cookie(cookie.clone())
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/caller").cookie(cookie).to_request(),
        )
        .await;
        let body = test::read_body(res).await;
        assert!(
            std::str::from_utf8(&body)
                .expect("utf8")
                .starts_with("Unverifiable"),
            "unexpected caller: {body:?}"
        );
    }
}
