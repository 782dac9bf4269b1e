//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, test, web};
use argon2::Params;
use chrono::Utc;
use serde_json::json;

use crate::domain::ports::{AccountRepository, CredentialHasher, NewAccount};
use crate::domain::{EmailAddress, ProfileName, Role, UserId};
use crate::outbound::crypto::Argon2CredentialHasher;
use crate::outbound::memory::InMemoryStore;

use super::state::{Adapters, HttpState, HttpStatePorts};
use super::{configure_api, configure_functions};

/// Password given to every account created through [`TestBackend::account`].
pub const TEST_PASSWORD: &str = "CorrectHorse9!";

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Argon2 with the smallest legal cost so tests stay fast.
pub fn cheap_hasher() -> Argon2CredentialHasher {
    match Params::new(8, 1, 1, None) {
        Ok(params) => Argon2CredentialHasher::with_params(params),
        Err(error) => panic!("argon2 test params rejected: {error}"),
    }
}

/// Real domain services wired over an [`InMemoryStore`].
pub struct TestBackend {
    pub store: Arc<InMemoryStore>,
    pub state: web::Data<HttpState>,
    hasher: Arc<Argon2CredentialHasher>,
}

impl TestBackend {
    pub fn new() -> Self {
        let store = Arc::new(InMemoryStore::new());
        let hasher = Arc::new(cheap_hasher());
        let ports = HttpStatePorts::from_adapters(
            Adapters {
                accounts: store.clone(),
                roles: store.clone(),
                tickets: store.clone(),
                messages: store.clone(),
                assets: store.clone(),
                audit: store.clone(),
                objects: store.clone(),
                hasher: hasher.clone(),
            },
            Arc::new(mockable::DefaultClock),
        );
        Self {
            store,
            state: web::Data::new(HttpState::new(ports)),
            hasher,
        }
    }

    /// Insert an account holding `roles` whose password is [`TEST_PASSWORD`].
    pub async fn account(&self, email: &str, roles: &[Role]) -> UserId {
        let id = UserId::random();
        let account = NewAccount {
            id,
            email: EmailAddress::new(email).expect("test email"),
            name: ProfileName::new(email.split('@').next().unwrap_or(email)).expect("test name"),
            password_hash: self.hasher.hash(TEST_PASSWORD).expect("hash"),
            roles: roles.to_vec(),
            created_at: Utc::now(),
        };
        self.store.create(&account).await.expect("create account");
        id
    }

    /// Application with every route, the session middleware and extractor configs.
    pub fn app(
        &self,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        > + use<>,
    > {
        App::new()
            .app_data(self.state.clone())
            .app_data(super::validation::json_config())
            .app_data(super::validation::query_config())
            .wrap(test_session_middleware())
            .service(web::scope("/api/v1").configure(configure_api))
            .service(web::scope("/functions/v1").configure(configure_functions))
    }
}

impl Default for TestBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Log in through the API and return the issued session cookie.
pub async fn login_cookie(
    app: &impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
    email: &str,
) -> Cookie<'static> {
    let res = test::call_service(
        app,
        test::TestRequest::post()
            .uri("/api/v1/auth/login")
            .set_json(json!({ "email": email, "password": TEST_PASSWORD }))
            .to_request(),
    )
    .await;
    assert!(res.status().is_success(), "login failed: {}", res.status());
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(|cookie| cookie.into_owned())
        .expect("session cookie")
}
