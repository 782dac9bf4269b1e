//! Server harness and shared world for helpdesk behaviour tests.
//!
//! The harness owns a single-threaded Tokio runtime plus a `LocalSet` because
//! Actix uses `spawn_local` internally. Every account, ticket and attachment
//! lives in one [`InMemoryStore`] so steps can inspect the audit log directly.
//! The `WorldFixture` stops the server even if a step panics.

use std::cell::RefCell;
use std::collections::HashMap;
use std::net::TcpListener;
use std::rc::Rc;
use std::sync::Arc;

use actix_web::cookie::{Key, SameSite};
use actix_web::dev::ServerHandle;
use actix_web::http::{Method, header};
use actix_web::{App, HttpServer, web};
use argon2::Params;
use awc::Client;
use helpdesk::Trace;
use helpdesk::domain::TRACE_ID_HEADER;
use helpdesk::inbound::http::session_config::SessionSettings;
use helpdesk::inbound::http::state::{Adapters, HttpState, HttpStatePorts};
use helpdesk::inbound::http::validation::{json_config, query_config};
use helpdesk::inbound::http::{configure_api, configure_functions};
use helpdesk::outbound::crypto::Argon2CredentialHasher;
use helpdesk::outbound::memory::InMemoryStore;
use serde_json::Value;
use tokio::runtime::Runtime;
use tokio::task::LocalSet;

/// Password used for every student account created by a step.
pub(crate) const STUDENT_PASSWORD: &str = "StudentPass1!";

pub(crate) struct HelpdeskWorld {
    pub(crate) runtime: Runtime,
    pub(crate) local: LocalSet,
    pub(crate) base_url: String,
    pub(crate) server: ServerHandle,
    pub(crate) store: Arc<InMemoryStore>,
    pub(crate) cookies: HashMap<String, String>,
    pub(crate) ticket_id: Option<String>,
    pub(crate) opening_message_id: Option<String>,
    pub(crate) last_status: Option<u16>,
    pub(crate) last_body: Option<Value>,
    pub(crate) last_trace_id: Option<String>,
}

pub(crate) type SharedWorld = Rc<RefCell<HelpdeskWorld>>;

pub(crate) struct WorldFixture {
    world: SharedWorld,
}

impl WorldFixture {
    pub(crate) fn world(&self) -> SharedWorld {
        self.world.clone()
    }
}

impl Drop for WorldFixture {
    fn drop(&mut self) {
        let ctx = self.world.borrow();
        let server = ctx.server.clone();
        ctx.local.block_on(&ctx.runtime, async move {
            server.stop(true).await;
        });
    }
}

/// Captured outcome of one HTTP exchange.
pub(crate) struct Captured {
    pub(crate) status: u16,
    pub(crate) trace_id: Option<String>,
    pub(crate) set_cookie: Option<String>,
    pub(crate) body: Option<Value>,
}

/// One request issued by a step.
pub(crate) struct StepRequest<'a> {
    pub(crate) persona: Option<&'a str>,
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) body: StepBody,
}

pub(crate) enum StepBody {
    Empty,
    Json(Value),
    Bytes {
        content_type: &'static str,
        bytes: Vec<u8>,
    },
}

fn cheap_hasher() -> Argon2CredentialHasher {
    let params = Params::new(8, 1, 1, None).expect("argon2 params");
    Argon2CredentialHasher::with_params(params)
}

fn in_memory_state(store: &Arc<InMemoryStore>) -> HttpState {
    HttpState::new(HttpStatePorts::from_adapters(
        Adapters {
            accounts: store.clone(),
            roles: store.clone(),
            tickets: store.clone(),
            messages: store.clone(),
            assets: store.clone(),
            audit: store.clone(),
            objects: store.clone(),
            hasher: Arc::new(cheap_hasher()),
        },
        Arc::new(mockable::DefaultClock),
    ))
}

async fn spawn_server(state: HttpState) -> Result<(String, ServerHandle), String> {
    let session = SessionSettings {
        key: Key::generate(),
        cookie_secure: false,
        same_site: SameSite::Lax,
    };
    let listener = TcpListener::bind("127.0.0.1:0").map_err(|err| err.to_string())?;
    let addr = listener.local_addr().map_err(|err| err.to_string())?;
    let http_data = web::Data::new(state);

    let server = HttpServer::new(move || {
        App::new()
            .app_data(http_data.clone())
            .app_data(json_config())
            .app_data(query_config())
            .wrap(session.middleware())
            .wrap(Trace)
            .service(web::scope("/api/v1").configure(configure_api))
            .service(web::scope("/functions/v1").configure(configure_functions))
    })
    .disable_signals()
    .workers(1)
    .listen(listener)
    .map_err(|err| err.to_string())?
    .run();

    let handle = server.handle();
    actix_web::rt::spawn(server);
    Ok((format!("http://{addr}"), handle))
}

pub(crate) fn world() -> WorldFixture {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("tokio runtime");
    let local = LocalSet::new();
    let store = Arc::new(InMemoryStore::new());
    let state = in_memory_state(&store);
    let (base_url, server) = local
        .block_on(&runtime, spawn_server(state))
        .expect("spawn helpdesk server");

    WorldFixture {
        world: Rc::new(RefCell::new(HelpdeskWorld {
            runtime,
            local,
            base_url,
            server,
            store,
            cookies: HashMap::new(),
            ticket_id: None,
            opening_message_id: None,
            last_status: None,
            last_body: None,
            last_trace_id: None,
        })),
    }
}

fn header_value(response_headers: &header::HeaderMap, name: &str) -> Option<String> {
    response_headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
}

/// Send `request` and record its outcome as the world's last response.
///
/// A `Set-Cookie` header is stored against the request's persona so later
/// steps act as that user.
pub(crate) fn send(world: &SharedWorld, request: StepRequest<'_>) -> Captured {
    let StepRequest {
        persona,
        method,
        path,
        body,
    } = request;
    let cookie = persona.and_then(|persona| world.borrow().cookies.get(persona).cloned());
    let captured = {
        let ctx = world.borrow();
        let url = format!("{}{path}", ctx.base_url);
        ctx.local.block_on(&ctx.runtime, async move {
            let mut outgoing = Client::default().request(method, url);
            if let Some(cookie) = cookie {
                outgoing = outgoing.insert_header((header::COOKIE, cookie));
            }
            let mut response = match body {
                StepBody::Empty => outgoing.send().await,
                StepBody::Json(payload) => outgoing.send_json(&payload).await,
                StepBody::Bytes {
                    content_type,
                    bytes,
                } => {
                    outgoing
                        .insert_header((header::CONTENT_TYPE, content_type))
                        .send_body(bytes)
                        .await
                }
            }
            .expect("helpdesk request");
            let status = response.status().as_u16();
            let trace_id = header_value(response.headers(), TRACE_ID_HEADER);
            let set_cookie = header_value(response.headers(), header::SET_COOKIE.as_str());
            let raw = response.body().limit(8 * 1024 * 1024).await.expect("body");
            let body = serde_json::from_slice(&raw).ok();
            Captured {
                status,
                trace_id,
                set_cookie,
                body,
            }
        })
    };

    let mut ctx = world.borrow_mut();
    if let (Some(persona), Some(set_cookie)) = (persona, captured.set_cookie.as_deref()) {
        let pair = set_cookie.split(';').next().unwrap_or(set_cookie).to_owned();
        ctx.cookies.insert(persona.to_owned(), pair);
    }
    ctx.last_status = Some(captured.status);
    ctx.last_trace_id = captured.trace_id.clone();
    ctx.last_body = captured.body.clone();
    captured
}

/// Email address of a student persona.
pub(crate) fn student_email(name: &str) -> String {
    format!("{name}@student.example.ac.uk")
}

pub(crate) fn last_status(world: &SharedWorld) -> Option<u16> {
    world.borrow().last_status
}

pub(crate) fn last_body(world: &SharedWorld) -> Value {
    world.borrow().last_body.clone().expect("json response body")
}
